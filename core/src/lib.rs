//! Chat-driven 3D model editing: transcript state machine, backend contract
//! and wire types shared by the terminal and browser clients.

pub mod api;
pub mod errors;
pub mod input;
pub mod models;
pub mod session;

pub use api::{EditGateway, EmailGateway};
pub use errors::RequestError;
pub use models::{ChatEditResponse, EmailSubmitResponse, Message, MessageRole, ToolInvocation};
pub use session::{ChatSession, ChatSessionState, ResetOutcome, SendOutcome, SessionEvent};
