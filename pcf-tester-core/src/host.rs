//! Host model: what a hosting platform hands to a control, and what it can be asked to do
//!
//! The platform itself is not reimplemented. [`HostContext`] is a plain
//! snapshot of what the platform exposes on each lifecycle call, and
//! [`Host`] is the set of callbacks a control may invoke. Controls never call
//! [`Host`] directly; their reducers emit [`HostCall`] values that the driver
//! applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-session dictionary the host persists on behalf of the control.
pub type ControlState = BTreeMap<String, String>;

/// Raw parameter values keyed by manifest name. `None` is a parameter that
/// exists but has no raw value (datasets, unbound properties).
pub type Parameters = BTreeMap<String, Option<String>>;

/// Space allocated to the control. `-1` means the host did not report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub allocated_width: i32,
    pub allocated_height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            allocated_width: -1,
            allocated_height: -1,
        }
    }
}

/// A dataset column as declared by the host view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub order: i32,
}

impl Column {
    /// Visible columns are not hidden and have a real position in the view.
    pub fn is_visible(&self) -> bool {
        !self.is_hidden && self.order != -1
    }

    /// `name` or `name(alias)`
    pub fn logical_name(&self) -> String {
        match &self.alias {
            Some(alias) if !alias.is_empty() => format!("{}({})", self.name, alias),
            _ => self.name.clone(),
        }
    }
}

/// One record of the current page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    /// Formatted values keyed by column name
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Record {
    /// Formatted value for a column, empty when the record has none.
    pub fn formatted_value(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Paging information for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub total_result_count: i64,
    pub first_page_number: u32,
    pub last_page_number: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub page_size: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            total_result_count: 0,
            first_page_number: 1,
            last_page_number: 1,
            has_previous_page: false,
            has_next_page: false,
            page_size: 25,
        }
    }
}

/// A paged record set bound to the control.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSet {
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Records of the current page, in sorted order
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub paging: Paging,
    #[serde(default)]
    pub selected_record_ids: Vec<String>,
}

impl DataSet {
    pub fn sorted_record_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_visible())
    }

    pub fn hidden_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_visible())
    }
}

/// Snapshot of host state passed to every lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostContext {
    pub viewport: Viewport,
    #[serde(default)]
    pub parameters: Parameters,
    /// The `dataset_a` parameter, when the control is bound to one
    #[serde(default)]
    pub dataset: Option<DataSet>,
    /// Property names the host reports as changed since the last update
    #[serde(default)]
    pub updated_properties: Vec<String>,
}

impl HostContext {
    /// Raw value of a parameter, `None` when missing or unset.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(|v| v.as_deref())
    }

    /// Whether `name` is in this cycle's changed property list.
    pub fn was_updated(&self, name: &str) -> bool {
        self.updated_properties.iter().any(|p| p == name)
    }
}

/// Callbacks a control may ask its host to perform.
pub trait Host {
    /// Current snapshot of host state
    fn context(&self) -> &HostContext;

    /// Signal that a control action occurred (the `OnAction` event)
    fn on_action(&mut self);

    /// Signal that new outputs are ready to be retrieved
    fn notify_output_changed(&mut self);

    fn track_container_resize(&mut self, enabled: bool);
    fn set_control_state(&mut self, state: ControlState);
    fn set_selected_record_ids(&mut self, ids: Vec<String>);
    fn set_page_size(&mut self, size: u32);
    fn load_next_page(&mut self);
    fn load_previous_page(&mut self);
    fn load_exact_page(&mut self, page: u32);
    fn refresh_dataset(&mut self);
}

/// One host callback, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    OnAction,
    NotifyOutputChanged,
    TrackContainerResize(bool),
    SetControlState(ControlState),
    SetSelectedRecordIds(Vec<String>),
    SetPageSize(u32),
    LoadNextPage,
    LoadPreviousPage,
    LoadExactPage(u32),
    RefreshDataset,
}

impl HostCall {
    /// Invoke the matching callback on `host`.
    pub fn apply<H: Host + ?Sized>(self, host: &mut H) {
        match self {
            HostCall::OnAction => host.on_action(),
            HostCall::NotifyOutputChanged => host.notify_output_changed(),
            HostCall::TrackContainerResize(enabled) => host.track_container_resize(enabled),
            HostCall::SetControlState(state) => host.set_control_state(state),
            HostCall::SetSelectedRecordIds(ids) => host.set_selected_record_ids(ids),
            HostCall::SetPageSize(size) => host.set_page_size(size),
            HostCall::LoadNextPage => host.load_next_page(),
            HostCall::LoadPreviousPage => host.load_previous_page(),
            HostCall::LoadExactPage(page) => host.load_exact_page(page),
            HostCall::RefreshDataset => host.refresh_dataset(),
        }
    }
}
