mod deferred;
mod observers;

pub use self::{
    deferred::Deferred,
    observers::{Observers, SubscriptionId},
};
