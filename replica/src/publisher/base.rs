use std::future::Future;

use crate::error::ReplicaResult;

/// Delivers serialized lifecycle notifications to a messaging channel.
pub trait Publisher {
    fn publish(
        &self,
        topic: &str,
        subject: Option<&str>,
        body: String,
    ) -> impl Future<Output = ReplicaResult<()>> + Send;
}
