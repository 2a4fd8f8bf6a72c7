//! These models represent the objects passed around by the coach
//!
//! There are a few related formats we need to interact with:
//! - chat history sent from the web client to the server
//! - chat-completion messages/tools, sent from the coach to the LLM
//! - tool invocations, sent from the loop to the tool registry
//!
//! We always immediately convert those wire shapes into the internal structs using
//! to/from helpers, so the internal models stay independent of any one endpoint.
pub mod message;
pub mod role;
pub mod tool;
pub mod turn;
