//! # Job Resolver
//!
//! Turns catalog and order declarations into [`ResolvedOrder`]s. All
//! checks run before anything is fetched or written, and a single failure
//! aborts the whole plan.
//!
//! Check order:
//!
//! 1. catalog aliases are unique
//! 2. every alias an order names is defined
//! 3. no two orders share a destination URI
//! 4. every catalog URI parses to a fetchable scheme, referenced or not
//! 5. every order URI parses to a writable scheme

use std::collections::{HashMap, HashSet};

use capem_core::{CatalogEntry, Locator, LocatorError, OrderEntry, SharedLogger};
use capem_source::{SourceAdapter, SourceBackends};
use tokio_util::sync::CancellationToken;

use crate::destination::DestinationAdapter;
use crate::env_file::EnvFile;
use crate::error::{DeliveryError, ResolutionError};

/// A destination with its sources bound, ready to run.
#[derive(Debug, Clone)]
pub struct ResolvedOrder {
    destination: DestinationAdapter,
    sources: Vec<SourceAdapter>,
}

impl ResolvedOrder {
    /// Text of the destination locator.
    pub fn destination(&self) -> &str {
        self.destination.locator_text()
    }

    /// Sources in concatenation order.
    pub fn sources(&self) -> &[SourceAdapter] {
        &self.sources
    }

    /// Fetch every source and write the destination.
    pub async fn deliver(
        &self,
        env_file: &EnvFile,
        cancel: &CancellationToken,
    ) -> Result<(), DeliveryError> {
        self.destination
            .deliver(&self.sources, env_file, cancel)
            .await
    }
}

/// Builds execution plans against one set of backends.
#[derive(Clone)]
pub struct Resolver {
    backends: SourceBackends,
    source_logger: Option<SharedLogger>,
    destination_logger: Option<SharedLogger>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("backends", &self.backends)
            .field("source_logger", &self.source_logger.is_some())
            .field("destination_logger", &self.destination_logger.is_some())
            .finish()
    }
}

impl Resolver {
    /// A resolver binding sources to `backends`.
    pub fn new(backends: SourceBackends) -> Self {
        Self {
            backends,
            source_logger: None,
            destination_logger: None,
        }
    }

    /// Attach `logger` to every source adapter built.
    pub fn with_source_logger(mut self, logger: SharedLogger) -> Self {
        self.source_logger = Some(logger);
        self
    }

    /// Attach `logger` to every destination adapter built.
    pub fn with_destination_logger(mut self, logger: SharedLogger) -> Self {
        self.destination_logger = Some(logger);
        self
    }

    /// Validate the declarations and bind adapters.
    ///
    /// # Errors
    ///
    /// The first [`ResolutionError`] found, in the check order listed in
    /// the module documentation. Nothing is fetched or written either way.
    pub fn resolve(
        &self,
        catalogs: &[CatalogEntry],
        orders: &[OrderEntry],
    ) -> Result<Vec<ResolvedOrder>, ResolutionError> {
        let mut by_alias: HashMap<&str, &CatalogEntry> = HashMap::with_capacity(catalogs.len());
        for entry in catalogs {
            if by_alias.insert(entry.alias.as_str(), entry).is_some() {
                return Err(ResolutionError::DuplicateAlias {
                    alias: entry.alias.clone(),
                });
            }
        }

        for order in orders {
            if let Some(alias) = order
                .aliases
                .iter()
                .find(|a| !by_alias.contains_key(a.as_str()))
            {
                return Err(ResolutionError::UndefinedAlias {
                    alias: alias.clone(),
                    destination: order.uri.clone(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(orders.len());
        for order in orders {
            if !seen.insert(order.uri.as_str()) {
                return Err(ResolutionError::DuplicateDestination {
                    uri: order.uri.clone(),
                });
            }
        }

        let mut sources: HashMap<&str, SourceAdapter> = HashMap::with_capacity(catalogs.len());
        for entry in catalogs {
            sources.insert(entry.alias.as_str(), self.source(entry)?);
        }

        orders
            .iter()
            .map(|order| {
                let destination = self.destination(&order.uri)?;
                Ok(ResolvedOrder {
                    destination,
                    sources: bind_sources(order, &sources)?,
                })
            })
            .collect()
    }

    fn source(&self, entry: &CatalogEntry) -> Result<SourceAdapter, ResolutionError> {
        let unsupported = || ResolutionError::UnsupportedSourceScheme {
            alias: entry.alias.clone(),
            uri: entry.uri.clone(),
        };

        let locator = match Locator::parse(&entry.uri) {
            Ok(locator) => locator,
            Err(LocatorError::UnknownScheme { .. }) => return Err(unsupported()),
            Err(source) => {
                return Err(ResolutionError::InvalidSource {
                    alias: entry.alias.clone(),
                    source,
                })
            }
        };

        let adapter = SourceAdapter::new(locator, entry.category, &self.backends)
            .map_err(|_| unsupported())?;
        Ok(match &self.source_logger {
            Some(logger) => adapter.with_logger(logger.clone()),
            None => adapter,
        })
    }

    fn destination(&self, uri: &str) -> Result<DestinationAdapter, ResolutionError> {
        let unsupported = || ResolutionError::UnsupportedDestinationScheme {
            uri: uri.to_string(),
        };

        let locator = match Locator::parse(uri) {
            Ok(locator) => locator,
            Err(LocatorError::UnknownScheme { .. }) => return Err(unsupported()),
            Err(source) => return Err(ResolutionError::InvalidDestination { source }),
        };

        let adapter = DestinationAdapter::new(locator).map_err(|_| unsupported())?;
        Ok(match &self.destination_logger {
            Some(logger) => adapter.with_logger(logger.clone()),
            None => adapter,
        })
    }
}

/// The adapters for `order`'s aliases, in declared order.
fn bind_sources(
    order: &OrderEntry,
    sources: &HashMap<&str, SourceAdapter>,
) -> Result<Vec<SourceAdapter>, ResolutionError> {
    order
        .aliases
        .iter()
        .map(|alias| {
            sources
                .get(alias.as_str())
                .cloned()
                .ok_or_else(|| ResolutionError::UndefinedAlias {
                    alias: alias.clone(),
                    destination: order.uri.clone(),
                })
        })
        .collect()
}
