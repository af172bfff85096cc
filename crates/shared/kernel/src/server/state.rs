use axum::extract::FromRef;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use trai_database::Database;
use trai_domain::config::ApiConfig;
use trai_domain::registry::{FeatureSlice, InitializedSlice};
use trai_event_bus::EventBus;

#[trai_derive::trai_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Feature slice registered twice{}: {message}", format_context(.context))]
    DuplicateSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub database: Database,
    pub events: EventBus,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Router state: shared infrastructure plus the registered feature slices.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast::<T>)
    }

    /// # Errors
    /// [`ApiStateError::MissingSlice`] if `T` was never registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Registered slice names, sorted, for start-up diagnostics.
    #[must_use]
    pub fn slice_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.slices.values().map(InitializedSlice::name).collect();
        names.sort_unstable();
        names
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Database {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.database.clone()
    }
}

impl FromRef<ApiState> for EventBus {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.events.clone()
    }
}

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    events: Option<EventBus>,
    slices: Vec<InitializedSlice>,
}

impl ApiStateBuilder {
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.push(slice);
        self
    }

    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        self.slices.extend(slices);
        self
    }

    /// # Errors
    /// * [`ApiStateError::Validation`] without a config or a database;
    /// * [`ApiStateError::DuplicateSlice`] when two slices share a type or a name.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let database = self.database.ok_or_else(|| ApiStateError::Validation {
            message: "Database not provided".into(),
            context: None,
        })?;
        let events = self.events.unwrap_or_default();

        let mut slices: FxHashMap<TypeId, InitializedSlice> = FxHashMap::default();
        for slice in self.slices {
            let name = slice.name();
            if slices.values().any(|known| known.name() == name) {
                return Err(ApiStateError::DuplicateSlice { message: name.into(), context: None });
            }
            if let Some(previous) = slices.insert(slice.id(), slice) {
                return Err(ApiStateError::DuplicateSlice { message: previous.name().into(), context: None });
            }
        }

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, database, events, slices }) })
    }
}
