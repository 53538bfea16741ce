//! Plugin bridge
//!
//! The request/response surface a host uses to drive the recorder: one JSON
//! object per line in each direction. Method names and error codes are the
//! ones mobile voice recorder plugins report to their JavaScript callers.

mod dispatcher;
mod request;
mod response;

pub use dispatcher::{Bridge, RequestHandler};
pub use request::Request;
pub use response::{BridgeError, ErrorBody, ErrorCode, RecordData, Response, Value};
