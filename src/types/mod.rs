// Public modules
pub mod content;
pub mod error_response;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod turn;

// Re-exports
pub use content::{Content, Part};
pub use error_response::{ErrorObject, ErrorResponse};
pub use generate_content_request::GenerateContentRequest;
pub use generate_content_response::{Candidate, CandidateContent, GenerateContentResponse};
pub use turn::{Role, Turn};
