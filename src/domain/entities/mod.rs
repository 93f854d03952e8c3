pub mod post;
pub mod record;
pub mod user;

pub use post::{
    CommentBody, ImageBody, InteractionStats, Post, PostBody, PostMetadata, PostState, TextBody,
    UnrecognizedBody, ViewerState,
};
pub use record::{RawAuthor, RawFeedRecord, RecordPayload};
pub use user::AuthorRef;
