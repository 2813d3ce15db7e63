pub mod avatar;
pub mod context;
pub mod deferred;
pub mod disclosure;
pub mod membership;
pub mod record;
pub mod runtime;

pub use avatar::{
    AvatarLoadScope, AvatarLoadState, AvatarLoadStatus, AvatarLoader, AvatarProbeError,
    ImageProbe, ProbeFuture, StatusListener, UnreachableImageProbe,
};
pub use context::{ScopeMissingError, ScopedContext, Scopes};
pub use deferred::DeferredFlag;
pub use disclosure::{DisclosureProps, DisclosureScope, DisclosureState, OpenChangeHandler};
pub use membership::{ThreadIdentity, ThreadMembershipScope, ThreadMembershipState};
pub use record::{TweetRecordScope, TweetRecordState};
pub use runtime::{
    Delivery, Effect, Runtime, RuntimeError, TaskHandle, TaskId, TaskOutput, TaskSink, UpdateQueue,
};

pub static DISCLOSURE: ScopedContext<DisclosureScope> = ScopedContext::new("Thread.Root");
pub static AVATAR_LOAD: ScopedContext<AvatarLoadScope> = ScopedContext::new("Tweet.Avatar");
pub static TWEET_RECORD: ScopedContext<TweetRecordScope> = ScopedContext::new("Tweet.Root");
pub static THREAD_MEMBERSHIP: ScopedContext<ThreadMembershipScope> = ScopedContext::new("Threads");
pub static THREAD_IDENTITY: ScopedContext<ThreadIdentity> = ScopedContext::new("Thread");

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_thread_scopes_outside_threads() {
        let scopes = Scopes::new();
        let err = THREAD_MEMBERSHIP.require(&scopes, "ThreadTrigger").unwrap_err();
        assert_eq!(err.to_string(), "ThreadTrigger must be used within Threads");
        let err = THREAD_IDENTITY.require(&scopes, "ThreadTails").unwrap_err();
        assert_eq!(err.to_string(), "ThreadTails must be used within Thread");
    }

    #[test]
    fn test_nested_thread_identity() {
        let (runtime, _queue) = Runtime::new();
        let membership = Rc::new(ThreadMembershipScope::new(
            &runtime,
            &ThreadMembershipState::new(),
        ));
        let scopes = THREAD_MEMBERSHIP.provide_rc(&Scopes::new(), membership);
        let scopes = THREAD_IDENTITY.provide(&scopes, ThreadIdentity::new("t1"));

        let identity = THREAD_IDENTITY.require(&scopes, "ThreadTrigger").unwrap();
        let membership = THREAD_MEMBERSHIP.require(&scopes, "ThreadTrigger").unwrap();
        membership.toggle(&identity.thread_id);
        assert!(membership.is_open("t1"));
    }
}
