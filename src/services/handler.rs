//! Platform-agnostic route logic shared by the axum and esp-idf servers.
//!
//! Both HTTP frontends reduce to the same two operations: dispatch a command
//! token and snapshot the vehicle state. Keeping that logic here means the
//! desktop server and the on-vehicle server cannot drift apart in behavior
//! or response shape.

use core::fmt::Debug;

use crate::drive::Duty;
use crate::services::api::{ApiResponse, CommandResponse, StateResponse};
use crate::services::shared::SharedDispatcher;
use crate::traits::{DigitalOutput, PwmOutput, VoltageSensor};

/// Dispatch one command token and shape the result for the wire.
///
/// Every dispatch outcome (executed, discarded as unsafe, ignored) is a
/// successful response; only a hardware fault becomes an error response.
/// The HTTP status stays 200 either way, so simple clients that only check
/// the status keep working like they did against the original firmware.
pub fn handle_command<O, P, S>(
    shared: &SharedDispatcher<O, P, S>,
    token: &str,
    duty: Option<Duty>,
) -> ApiResponse<CommandResponse>
where
    O: DigitalOutput,
    P: PwmOutput<Error = O::Error>,
    S: VoltageSensor<Error = O::Error>,
    O::Error: Debug,
{
    match shared.dispatch(token, duty) {
        Ok(outcome) => ApiResponse::ok(CommandResponse::from(outcome)),
        Err(e) => ApiResponse::err(format!("hardware fault: {:?}", e)),
    }
}

/// Snapshot the vehicle state for `GET /api/state`.
pub fn handle_state<O, P, S>(shared: &SharedDispatcher<O, P, S>) -> ApiResponse<StateResponse>
where
    O: DigitalOutput,
    P: PwmOutput<Error = O::Error>,
    S: VoltageSensor<Error = O::Error>,
    O::Error: Debug,
{
    match shared.snapshot() {
        Ok(snap) => ApiResponse::ok(StateResponse::from(&snap)),
        Err(e) => ApiResponse::err(format!("hardware fault: {:?}", e)),
    }
}

/// Extract an optional `duty=N` override from a raw request URI.
///
/// Used by the esp-idf server, which hands us the full URI string. A
/// missing or malformed value means "use the default duty"; out-of-range
/// values clamp like every other duty input.
pub fn duty_from_uri(uri: &str) -> Option<Duty> {
    let query = uri.split_once('?')?.1;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("duty="))
        .and_then(|value| value.parse::<u16>().ok())
        .map(Duty::new)
}
