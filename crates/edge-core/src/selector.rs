//! Driver selection for log streaming.
//!
//! A reference is `"all"`, a driver id, or a 1-based index into the hub's
//! driver list sorted by name.

use std::io;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::error::{CoreError, SelectError};
use crate::protocol::DriverInfo;

/// Reference selecting the aggregate stream of every driver.
pub const ALL_DRIVERS: &str = "all";

/// Which drivers to stream logs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverScope {
    All,
    Driver(String),
}

impl DriverScope {
    pub fn driver_id(&self) -> Option<&str> {
        match self {
            DriverScope::All => None,
            DriverScope::Driver(id) => Some(id),
        }
    }
}

/// Lists installed drivers.
#[async_trait]
pub trait DriverSource: Send + Sync {
    async fn drivers(&self) -> Result<Vec<DriverInfo>, CoreError>;
}

/// Operator interaction used while selecting a driver.
pub trait DriverPrompt {
    fn is_interactive(&self) -> bool;

    /// Show the numbered driver list.
    fn show_drivers(&self, drivers: &[DriverInfo]);

    /// Ask for an id or index, returning `default` on empty input.
    fn ask(&self, message: &str, default: &str) -> io::Result<String>;

    /// Report invalid input before asking again.
    fn reject(&self, message: &str);
}

/// A reference that names no installed driver.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid id or index \"{0}\". Please enter an index or valid id.")]
pub struct UnknownDriver(pub String);

/// Translate an id or 1-based index into a driver id.
///
/// An exact id match wins over an index, so drivers with numeric ids stay
/// reachable by id.
pub fn resolve_reference(reference: &str, drivers: &[DriverInfo]) -> Result<String, UnknownDriver> {
    let reference = reference.trim();

    if let Some(driver) = drivers.iter().find(|driver| driver.driver_id == reference) {
        return Ok(driver.driver_id.clone());
    }

    if reference.is_empty() || !reference.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnknownDriver(reference.to_string()));
    }

    reference
        .parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| drivers.get(index))
        .map(|driver| driver.driver_id.clone())
        .ok_or_else(|| UnknownDriver(reference.to_string()))
}

/// Sort drivers the way they are listed to the operator.
pub fn sort_drivers(drivers: &mut [DriverInfo]) {
    drivers.sort_by(|a, b| {
        a.driver_name
            .cmp(&b.driver_name)
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });
}

/// Resolve `reference` (or ask the operator) to a driver scope.
///
/// `"all"` never touches the driver list. Unknown references are re-prompted
/// when interactive.
pub async fn select_driver<S, P>(
    source: &S,
    prompt: &P,
    reference: Option<&str>,
) -> Result<DriverScope, SelectError>
where
    S: DriverSource + ?Sized,
    P: DriverPrompt + ?Sized,
{
    let reference = reference.map(str::trim).filter(|r| !r.is_empty());

    if reference == Some(ALL_DRIVERS) {
        return Ok(DriverScope::All);
    }

    if reference.is_none() && !prompt.is_interactive() {
        debug!("no driver given and not interactive; streaming all drivers");
        return Ok(DriverScope::All);
    }

    let mut drivers = source.drivers().await?;
    sort_drivers(&mut drivers);

    if let Some(reference) = reference {
        match resolve_reference(reference, &drivers) {
            Ok(id) => return Ok(DriverScope::Driver(id)),
            Err(unknown) if !prompt.is_interactive() => {
                return Err(SelectError::InvalidReference(unknown.to_string()))
            }
            Err(unknown) => prompt.reject(&unknown.to_string()),
        }
    }

    prompt.show_drivers(&drivers);

    loop {
        let input = prompt.ask("Enter id or index", ALL_DRIVERS)?;
        let input = input.trim();

        if input.is_empty() || input == ALL_DRIVERS {
            return Ok(DriverScope::All);
        }

        match resolve_reference(input, &drivers) {
            Ok(id) => return Ok(DriverScope::Driver(id)),
            Err(unknown) => prompt.reject(&unknown.to_string()),
        }
    }
}
