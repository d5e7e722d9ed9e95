use std::future::Future;
use std::pin::Pin;

use crate::error::Error;
use crate::training::{Activity, AthleteProfile, DateWindow, WellnessRecord};

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + 'a>>;

pub trait TrainingSource {
    fn fetch_profile(&self) -> SourceFuture<'_, AthleteProfile>;

    /// An empty window yields an empty list, not an error.
    fn fetch_activities(&self, window: DateWindow) -> SourceFuture<'_, Vec<Activity>>;

    /// An account without wellness data yields an empty list, not an error.
    fn fetch_wellness(&self, window: DateWindow) -> SourceFuture<'_, Vec<WellnessRecord>>;
}
