//! Inference service
//!
//! The immutable [`ServiceContext`] built at startup, and the request
//! handling that turns an upload into a JSON reply.

pub mod context;
pub mod handler;
pub mod response;

pub use context::ServiceContext;
pub use handler::{
    handle_predict, predict, status_reply, JsonReply, UploadedFiles, IMAGE_FIELD, STATUS_MESSAGE,
};
pub use response::{FoodPrediction, PredictionResult};
