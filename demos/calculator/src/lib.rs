//! Calculator service: the worked example used to exercise a Tessera client
//! and server end to end. One method, `Calculate`, taking an operation name
//! and two operands; division by zero and an unrecognized operation both
//! surface as opaque handler errors rather than framework-coded ones.

use serde::{Deserialize, Serialize};
use tessera_core::{CallContext, FrameworkError, Service, ServiceBuilder};

/// The service name this demo registers under (`/Calculator/Calculate`).
pub const SERVICE_NAME: &str = "Calculator";

/// `Calculate`'s request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// One of `"add"`, `"subtract"`, `"multiply"`, `"divide"`.
    pub operation: String,
    /// First operand.
    pub num1: f64,
    /// Second operand.
    pub num2: f64,
}

/// `Calculate`'s reply payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculateReply {
    /// The computed result.
    pub result: f64,
}

async fn calculate(_ctx: CallContext, req: CalculateRequest) -> Result<CalculateReply, FrameworkError> {
    let result = match req.operation.as_str() {
        "add" => req.num1 + req.num2,
        "subtract" => req.num1 - req.num2,
        "multiply" => req.num1 * req.num2,
        "divide" => {
            if req.num2 == 0.0 {
                return Err(FrameworkError::handler_error("division by zero"));
            }
            req.num1 / req.num2
        }
        other => return Err(FrameworkError::handler_error(format!("invalid operation: {other}"))),
    };
    Ok(CalculateReply { result })
}

/// Build the registered `Calculator` service.
///
/// # Errors
///
/// Never fails in practice — `ServiceBuilder::method` only errors on a
/// duplicate name, and this registers exactly one.
pub fn build_service() -> Result<Service, String> {
    Ok(ServiceBuilder::new(SERVICE_NAME).method("Calculate", calculate)?.build())
}
