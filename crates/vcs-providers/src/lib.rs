//! Concrete `VcsOperations`/`Reporter` implementations for hosted VCS
//! providers. Each module owns one provider's wire format; the core never
//! depends on this crate directly, only on the `review-types::ports` traits
//! it implements.

pub mod bitbucket_cloud;

pub use bitbucket_cloud::BitbucketCloudClient;
