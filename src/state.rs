use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::{Config, DashboardConfig};
use crate::data::error::{ExportError, LoadError};
use crate::data::filter::Selection;
use crate::data::model::{Column, Dataset, DatasetId};
use crate::data::source::{SalesQuery, SalesSource};
use crate::export::{self, ExportCache};
use crate::pipeline::{
    dashboard_view, raw_data_view, DashboardControls, DashboardView, RawDataBounds, RawDataControls,
    RawDataView,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    RawData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Revenue,
    SalesCount,
    Sellers,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,
    pub page: Page,
    pub dashboard: DashboardPage,
    pub raw_data: RawDataPage,
    /// Page the last refresh ran for; switching pages is a fresh page load.
    loaded_page: Option<Page>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            page: Page::Dashboard,
            loaded_page: None,
            dashboard: DashboardPage::new(&config.dashboard),
            raw_data: RawDataPage::new(&config),
            config,
        }
    }

    /// Make sure the visible page has the dataset its controls ask for.
    pub fn refresh(&mut self, source: &dyn SalesSource) {
        if self.loaded_page != Some(self.page) {
            log::debug!("Loading page {:?}", self.page);
            match self.page {
                Page::Dashboard => self.dashboard.retry(),
                Page::RawData => self.raw_data.retry(),
            }
            self.loaded_page = Some(self.page);
        }
        match self.page {
            Page::Dashboard => self.dashboard.refresh(source),
            Page::RawData => self.raw_data.refresh(source, &self.config),
        }
    }
}

fn describe(err: LoadError) -> String {
    let err = anyhow::Error::new(err);
    log::error!("Failed to load sales: {err:#}");
    format!("Error: {err:#}")
}

// ---------------------------------------------------------------------------
// Dashboard page
// ---------------------------------------------------------------------------

struct CachedDashboard {
    dataset: DatasetId,
    controls: DashboardControls,
    view: DashboardView,
}

pub struct DashboardPage {
    pub controls: DashboardControls,
    pub tab: DashboardTab,
    /// Dataset for the last fetched query (None until loaded or after a failure).
    pub dataset: Option<Dataset>,
    pub seller_options: Vec<String>,
    /// Status / error message shown in the UI.
    pub error: Option<String>,
    fetched: Option<SalesQuery>,
    cached: Option<CachedDashboard>,
}

impl DashboardPage {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            controls: DashboardControls::new(config),
            tab: DashboardTab::Revenue,
            dataset: None,
            seller_options: Vec::new(),
            error: None,
            fetched: None,
            cached: None,
        }
    }

    /// Fetch again if the region/year selection changed since the last fetch.
    pub fn refresh(&mut self, source: &dyn SalesSource) {
        let query = self.controls.query();
        if self.fetched == Some(query) {
            return;
        }
        self.fetched = Some(query);
        self.cached = None;

        match source.fetch(&query) {
            Ok(dataset) => {
                let options = dataset.unique_values(Column::Seller);
                if options != self.seller_options {
                    // a selection made against other sellers would hide the new ones
                    self.controls.sellers = Selection::Any;
                    self.seller_options = options;
                }
                self.dataset = Some(dataset);
                self.error = None;
            }
            Err(err) => {
                self.dataset = None;
                self.seller_options.clear();
                self.error = Some(describe(err));
            }
        }
    }

    /// Forget the last fetch so the next refresh goes back to the source.
    pub fn retry(&mut self) {
        self.fetched = None;
    }

    /// The view for the current controls, recomputed only when they changed.
    pub fn view(&mut self, config: &DashboardConfig) -> Option<&DashboardView> {
        let dataset = self.dataset.as_ref()?;
        let stale = self
            .cached
            .as_ref()
            .map_or(true, |c| c.dataset != dataset.id() || c.controls != self.controls);
        if stale {
            self.cached = Some(CachedDashboard {
                dataset: dataset.id(),
                controls: self.controls.clone(),
                view: dashboard_view(dataset, &self.controls, config),
            });
        }
        self.cached.as_ref().map(|c| &c.view)
    }
}

// ---------------------------------------------------------------------------
// Raw-data page
// ---------------------------------------------------------------------------

/// Choices offered by the multi-choice filters.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub sellers: Vec<String>,
    pub locations: Vec<String>,
}

impl FilterOptions {
    fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            products: dataset.unique_values(Column::Product),
            categories: dataset.unique_values(Column::Category),
            sellers: dataset.unique_values(Column::Seller),
            locations: dataset.unique_values(Column::Location),
        }
    }
}

/// Success message that disappears on its own.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    shown_at: Instant,
    ttl: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            shown_at: Instant::now(),
            ttl,
        }
    }

    /// Time left before dismissal, `None` once expired.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.ttl
            .checked_sub(now.saturating_duration_since(self.shown_at))
            .filter(|d| !d.is_zero())
    }
}

struct CachedRawData {
    dataset: DatasetId,
    controls: RawDataControls,
    view: RawDataView,
}

pub struct RawDataPage {
    pub controls: RawDataControls,
    pub dataset: Option<Dataset>,
    pub bounds: Option<RawDataBounds>,
    pub options: FilterOptions,
    pub error: Option<String>,
    pub notification: Option<Notification>,
    pub export_error: Option<String>,
    loaded: bool,
    cached: Option<CachedRawData>,
    export_cache: ExportCache,
}

impl RawDataPage {
    pub fn new(config: &Config) -> Self {
        Self {
            controls: RawDataControls::new(&config.raw_data),
            dataset: None,
            bounds: None,
            options: FilterOptions::default(),
            error: None,
            notification: None,
            export_error: None,
            loaded: false,
            cached: None,
            export_cache: ExportCache::new(config.raw_data.export_cache_capacity),
        }
    }

    /// Load the full dataset (no query parameters) once.
    pub fn refresh(&mut self, source: &dyn SalesSource, config: &Config) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        self.cached = None;

        match source.fetch(&SalesQuery::default()) {
            Ok(dataset) => {
                let bounds = RawDataControls::bounds(&dataset, &config.raw_data);
                self.controls.reset_ranges(&bounds);
                self.options = FilterOptions::from_dataset(&dataset);
                self.bounds = Some(bounds);
                self.dataset = Some(dataset);
                self.error = None;
            }
            Err(err) => {
                self.dataset = None;
                self.bounds = None;
                self.options = FilterOptions::default();
                self.error = Some(describe(err));
            }
        }
    }

    /// Fetch again on the next refresh.
    pub fn retry(&mut self) {
        self.loaded = false;
    }

    pub fn view(&mut self) -> Option<&RawDataView> {
        let dataset = self.dataset.as_ref()?;
        let stale = self
            .cached
            .as_ref()
            .map_or(true, |c| c.dataset != dataset.id() || c.controls != self.controls);
        if stale {
            self.cached = Some(CachedRawData {
                dataset: dataset.id(),
                controls: self.controls.clone(),
                view: raw_data_view(dataset, &self.controls),
            });
        }
        self.cached.as_ref().map(|c| &c.view)
    }

    /// File name offered in the save dialog.
    pub fn file_name(&self, config: &Config) -> String {
        export::export_file_name(&self.controls.file_stem, &config.raw_data.default_file_name)
    }

    /// Write the current table to `path` as CSV and raise the success toast.
    pub fn export_to(&mut self, path: &Path, ttl: Duration) -> Result<(), ExportError> {
        self.view();
        let (Some(dataset), Some(cached)) = (&self.dataset, &self.cached) else {
            return Ok(());
        };
        let bytes = self
            .export_cache
            .get_or_export(dataset, &cached.view.rows, &cached.view.columns)?;
        export::write_export(path, &bytes)?;
        self.export_error = None;
        self.notification = Some(Notification::new("File downloaded successfully", ttl));
        Ok(())
    }

    /// Drop the toast once it has expired; returns how long it has left.
    pub fn tick_notification(&mut self, now: Instant) -> Option<Duration> {
        let remaining = self.notification.as_ref().and_then(|n| n.remaining(now));
        if remaining.is_none() {
            self.notification = None;
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::error::FetchError;
    use crate::data::model::fixtures::sample_dataset;
    use crate::data::regions::Region;

    /// Serves the fixture dataset and counts calls.
    struct FakeSource {
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakeSource {
        fn new() -> Self {
            Self { calls: Cell::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: Cell::new(0), fail: true }
        }
    }

    impl SalesSource for FakeSource {
        fn fetch(&self, query: &SalesQuery) -> Result<Dataset, LoadError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(FetchError::Status {
                    status: 503,
                    url: "http://example.invalid".into(),
                }
                .into());
            }
            let all = sample_dataset();
            let rows: Vec<usize> = (0..all.len()).filter(|&i| query.matches(&all.records()[i])).collect();
            Ok(all.subset(&rows))
        }

        fn describe(&self) -> String {
            "fake".into()
        }
    }

    #[test]
    fn dashboard_fetches_once_per_query() {
        let config = Config::default();
        let source = FakeSource::new();
        let mut state = AppState::new(config);

        state.refresh(&source);
        state.refresh(&source);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(state.dashboard.seller_options.len(), 4);

        // client-side filters never refetch
        state.dashboard.controls.sellers = Selection::only(["Ana"]);
        state.refresh(&source);
        assert_eq!(source.calls.get(), 1);

        state.dashboard.controls.region = Region::South;
        state.refresh(&source);
        assert_eq!(source.calls.get(), 2);
        assert_eq!(state.dashboard.dataset.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn switching_pages_fetches_again() {
        let config = Config::default();
        let source = FakeSource::new();
        let mut state = AppState::new(config);

        for page in [Page::Dashboard, Page::RawData, Page::Dashboard, Page::RawData] {
            state.page = page;
            state.refresh(&source);
            state.refresh(&source);
        }
        assert_eq!(source.calls.get(), 4);
        assert!(state.raw_data.dataset.is_some());
    }

    #[test]
    fn new_sellers_reset_the_seller_selection() {
        let config = Config::default();
        let source = FakeSource::new();
        let mut state = AppState::new(config);
        state.dashboard.controls.region = Region::Southeast;
        state.refresh(&source);
        assert_eq!(state.dashboard.seller_options, vec!["Ana", "Bruno", "Carla"]);

        state.dashboard.controls.sellers = Selection::only(["Ana"]);
        state.dashboard.retry();
        state.refresh(&source);
        assert_eq!(state.dashboard.controls.sellers, Selection::only(["Ana"]));

        state.dashboard.controls.region = Region::Brazil;
        state.refresh(&source);
        assert_eq!(state.dashboard.seller_options.len(), 4);
        assert_eq!(state.dashboard.controls.sellers, Selection::Any);
    }

    #[test]
    fn dashboard_view_tracks_controls() {
        let config = Config::default();
        let source = FakeSource::new();
        let mut state = AppState::new(config);
        state.refresh(&source);

        let dashboard_config = state.config.dashboard.clone();
        assert_eq!(state.dashboard.view(&dashboard_config).unwrap().rows.len(), 7);

        state.dashboard.controls.sellers = Selection::only(["Bruno"]);
        assert_eq!(state.dashboard.view(&dashboard_config).unwrap().rows.len(), 2);
    }

    #[test]
    fn failed_fetch_leaves_no_stale_data() {
        let config = Config::default();
        let mut state = AppState::new(config);
        state.refresh(&FakeSource::new());
        assert!(state.dashboard.dataset.is_some());

        state.dashboard.controls.all_years = false;
        let failing = FakeSource::failing();
        state.refresh(&failing);
        assert!(state.dashboard.dataset.is_none());
        assert!(state.dashboard.error.as_deref().unwrap().contains("503"));

        // no retry loop until asked
        state.refresh(&failing);
        assert_eq!(failing.calls.get(), 1);
        state.dashboard.retry();
        state.refresh(&failing);
        assert_eq!(failing.calls.get(), 2);
    }

    #[test]
    fn raw_page_loads_everything_and_exports() {
        let config = Config::default();
        let source = FakeSource::new();
        let mut state = AppState::new(config);
        state.page = Page::RawData;
        state.refresh(&source);
        state.refresh(&source);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(state.raw_data.options.locations, vec!["BA", "MG", "RJ", "RS", "SP"]);

        state.raw_data.controls.columns = vec![Column::Product, Column::Seller];
        state.raw_data.controls.sellers = Selection::only(["Carla"]);
        assert_eq!(state.raw_data.view().unwrap().rows, vec![3]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw-export.csv");
        state.raw_data.export_to(&path, Duration::from_secs(5)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Product,Seller\nJogo de panelas,Carla\n");
        assert!(state.raw_data.notification.is_some());
    }

    #[test]
    fn notification_expires() {
        let config = Config::default();
        let mut page = RawDataPage::new(&config);
        page.notification = Some(Notification::new("done", Duration::from_secs(5)));

        let now = Instant::now();
        assert!(page.tick_notification(now).is_some());
        assert!(page.tick_notification(now + Duration::from_secs(6)).is_none());
        assert!(page.notification.is_none());
    }

    #[test]
    fn file_name_uses_default_stem() {
        let config = Config::default();
        let mut page = RawDataPage::new(&config);
        assert_eq!(page.file_name(&config), "data.csv");
        page.controls.file_stem = "vendas".into();
        assert_eq!(page.file_name(&config), "vendas.csv");
    }
}
