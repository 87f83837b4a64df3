//! Probes named by the persisted mode

use std::convert::Infallible;
use std::str::FromStr;

/// Parameters every host hands to a control regardless of its manifest.
/// The `inputs` probe leaves them out.
pub const PLATFORM_PARAMETERS: &[&str] = &[
    "labelForPrefix",
    "deviceSizeMode",
    "viewportSizeMode",
    "syncError",
    "scope",
    "forceColumnLayout",
    "autoExpand",
    "NativeFilterExpressionToRestore",
    "LookupAttributeNameForHierarchy",
    "useSkypeProtocol",
    "gridPageNumber",
    "isNewPageRequested",
    "enhancedPagingDisabled",
    "isActivityTypeFilterDisabled",
    "showAddNewCommand",
    "emptySubgridIconAndTextChanges",
    "emptyGridChangesIfQuickFindImprovementsEnabled",
    "headerDialogOnTop",
    "headerDialogPreventDismissOnScroll",
    "listSortHeaderEnabled",
];

/// One diagnostic probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    ClearEvents,
    /// Fails every view update after the first
    Error,
    Data,
    Columns,
    HiddenColumns,
    DataSet,
    Size,
    Updates,
    Inputs,
    State,
    Bound,
    /// Any other token, `default` included: logs a `---` row
    Other(String),
}

impl FromStr for Probe {
    type Err = Infallible;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token {
            "clearevents" => Probe::ClearEvents,
            "error" => Probe::Error,
            "data" => Probe::Data,
            "columns" => Probe::Columns,
            "hidden_columns" => Probe::HiddenColumns,
            "dataset" => Probe::DataSet,
            "size" => Probe::Size,
            "updates" => Probe::Updates,
            "inputs" => Probe::Inputs,
            "state" => Probe::State,
            "bound" => Probe::Bound,
            other => Probe::Other(other.to_string()),
        })
    }
}

impl Probe {
    pub fn parse(token: &str) -> Self {
        match token.parse() {
            Ok(probe) => probe,
            Err(never) => match never {},
        }
    }
}

/// Split a mode into its probes, in order. Tokens are trimmed; an empty
/// token still counts as a probe.
pub fn parse_mode(mode: &str) -> Vec<Probe> {
    mode.split(',').map(|t| Probe::parse(t.trim())).collect()
}
