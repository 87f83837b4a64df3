//! A simulated host for driving the control outside a real platform
//!
//! The host keeps a full record set and serves it one page at a time,
//! remembers the control state, and feeds outputs back in as inputs so that
//! bound properties round-trip. It never calls the control itself; the
//! [`Session`](crate::session::Session) reads the pending flags and runs the
//! matching lifecycle calls.

use std::fs;
use std::path::{Path, PathBuf};

use pcf_tester::{Column, ControlState, DataSet, Host, HostContext, Paging, Record, Viewport};
use serde::Deserialize;
use thiserror::Error;

use crate::state::PropertyBag;

/// Parameter name of the bound dataset.
pub const DATASET_PARAMETER: &str = "dataset_a";

/// Failure loading a dataset fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fixture {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk description of the host: viewport, parameters and a record set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub viewport: Option<Viewport>,
    pub parameters: PropertyBag,
    pub page_size: Option<u32>,
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| FixtureError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-process host.
#[derive(Debug, Clone)]
pub struct SimHost {
    context: HostContext,
    /// Every record the data source holds
    records: Vec<Record>,
    page: u32,
    /// Page to deliver once the current load completes
    loading_page: Option<u32>,
    /// Terminal size, reported once resize tracking is on
    size: (i32, i32),
    tracking_resize: bool,
    control_state: ControlState,
    outputs: PropertyBag,
    actions: u32,
    outputs_pending: bool,
    update_pending: bool,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// Host with no dataset bound.
    pub fn new() -> Self {
        Self {
            context: HostContext::default(),
            records: Vec::new(),
            page: 1,
            loading_page: None,
            size: (-1, -1),
            tracking_resize: false,
            control_state: ControlState::new(),
            outputs: PropertyBag::new(),
            actions: 0,
            outputs_pending: false,
            update_pending: false,
        }
    }

    /// Host with a dataset of `columns` over `records`, showing page 1.
    pub fn with_dataset(columns: Vec<Column>, records: Vec<Record>, page_size: u32) -> Self {
        let mut host = Self::new();
        host.records = records;
        host.context.dataset = Some(DataSet {
            columns,
            paging: Paging {
                page_size: page_size.max(1),
                ..Default::default()
            },
            ..Default::default()
        });
        host.context
            .parameters
            .insert(DATASET_PARAMETER.to_string(), None);
        host.load_page(1);
        host.context.updated_properties.clear();
        host
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let mut host = if fixture.columns.is_empty() && fixture.records.is_empty() {
            Self::new()
        } else {
            let page_size = fixture.page_size.unwrap_or(Paging::default().page_size);
            Self::with_dataset(fixture.columns, fixture.records, page_size)
        };
        if let Some(viewport) = fixture.viewport {
            host.size = (viewport.allocated_width, viewport.allocated_height);
        }
        for (name, value) in fixture.parameters {
            host.context.parameters.insert(name, Some(value));
        }
        host
    }

    /// Set a parameter's raw value as if the bound field changed.
    pub fn set_parameter(&mut self, name: &str, value: Option<String>) {
        self.context.parameters.insert(name.to_string(), value);
        self.mark_updated(name);
    }

    /// The hosting container changed size.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.size = (width, height);
        if self.tracking_resize {
            self.apply_viewport();
        }
    }

    pub fn control_state(&self) -> &ControlState {
        &self.control_state
    }

    /// Outputs from the last retrieval.
    pub fn outputs(&self) -> &PropertyBag {
        &self.outputs
    }

    /// How many times the control signalled `OnAction`.
    pub fn action_count(&self) -> u32 {
        self.actions
    }

    pub fn is_tracking_resize(&self) -> bool {
        self.tracking_resize
    }

    /// Ask for a view update on the next settle.
    pub fn request_update(&mut self) {
        self.update_pending = true;
    }

    /// Whether the control asked for its outputs to be read. Clears the flag.
    pub fn take_outputs_pending(&mut self) -> bool {
        std::mem::take(&mut self.outputs_pending)
    }

    /// Whether something changed that warrants a view update. Clears the flag.
    pub fn take_update_pending(&mut self) -> bool {
        std::mem::take(&mut self.update_pending)
    }

    /// Finish an in-flight page load. Returns whether one was pending.
    pub fn complete_load(&mut self) -> bool {
        match self.loading_page.take() {
            Some(page) => {
                self.load_page(page);
                true
            }
            None => false,
        }
    }

    /// Accept retrieved outputs. Values that differ from the current
    /// parameter are written back and reported as updated.
    pub fn receive_outputs(&mut self, outputs: PropertyBag) {
        for (name, value) in &outputs {
            let current = self.context.parameters.get(name).and_then(|v| v.as_deref());
            if current != Some(value.as_str()) {
                self.set_parameter(name, Some(value.clone()));
            }
        }
        self.outputs = outputs;
    }

    /// The view update has consumed this cycle's changed property list.
    pub fn end_cycle(&mut self) {
        self.context.updated_properties.clear();
    }

    fn mark_updated(&mut self, name: &str) {
        if !self.context.was_updated(name) {
            self.context.updated_properties.push(name.to_string());
        }
        self.update_pending = true;
    }

    fn apply_viewport(&mut self) {
        let (width, height) = self.size;
        let viewport = Viewport {
            allocated_width: width,
            allocated_height: height,
        };
        if self.context.viewport != viewport {
            self.context.viewport = viewport;
            self.mark_updated("layout");
        }
    }

    fn page_count(&self) -> u32 {
        let size = self
            .context
            .dataset
            .as_ref()
            .map_or(1, |ds| ds.paging.page_size.max(1)) as usize;
        (self.records.len().div_ceil(size) as u32).max(1)
    }

    fn load_page(&mut self, page: u32) {
        let last = self.page_count();
        let page = page.clamp(1, last);
        let Some(ds) = self.context.dataset.as_mut() else {
            return;
        };
        let size = ds.paging.page_size.max(1) as usize;
        let start = (page as usize - 1) * size;

        ds.records = self.records.iter().skip(start).take(size).cloned().collect();
        ds.loading = false;
        ds.paging.total_result_count = self.records.len() as i64;
        ds.paging.first_page_number = page;
        ds.paging.last_page_number = page;
        ds.paging.has_previous_page = page > 1;
        ds.paging.has_next_page = page < last;
        ds.selected_record_ids
            .retain(|id| self.records.iter().any(|r| &r.id == id));
        self.page = page;

        self.mark_updated(DATASET_PARAMETER);
        self.mark_updated("records_dataset_a");
    }

    /// Start loading `page`; the records arrive on [`complete_load`](Self::complete_load).
    fn begin_load(&mut self, page: u32) {
        let Some(ds) = self.context.dataset.as_mut() else {
            tracing::warn!("no dataset bound, ignoring paging request");
            return;
        };
        ds.loading = true;
        self.loading_page = Some(page);
        self.mark_updated(DATASET_PARAMETER);
    }
}

impl Host for SimHost {
    fn context(&self) -> &HostContext {
        &self.context
    }

    fn on_action(&mut self) {
        self.actions += 1;
        tracing::info!(count = self.actions, "OnAction");
    }

    fn notify_output_changed(&mut self) {
        self.outputs_pending = true;
    }

    fn track_container_resize(&mut self, enabled: bool) {
        self.tracking_resize = enabled;
        if enabled {
            self.apply_viewport();
        }
    }

    fn set_control_state(&mut self, state: ControlState) {
        self.control_state = state;
    }

    fn set_selected_record_ids(&mut self, ids: Vec<String>) {
        if let Some(ds) = self.context.dataset.as_mut() {
            ds.selected_record_ids = ids;
            self.mark_updated(DATASET_PARAMETER);
        }
    }

    fn set_page_size(&mut self, size: u32) {
        if let Some(ds) = self.context.dataset.as_mut() {
            ds.paging.page_size = size.max(1);
            self.begin_load(1);
        }
    }

    fn load_next_page(&mut self) {
        if self.page < self.page_count() {
            self.begin_load(self.page + 1);
        }
    }

    fn load_previous_page(&mut self) {
        if self.page > 1 {
            self.begin_load(self.page - 1);
        }
    }

    fn load_exact_page(&mut self, page: u32) {
        self.begin_load(page);
    }

    fn refresh_dataset(&mut self) {
        self.begin_load(self.page);
    }
}
