//! [`Handler`] abstractions.

use std::future::Future;

/// Asynchronous handler of an `Args` operation.
///
/// Every layer seam (commands, queries, storage backends) is expressed as a
/// set of [`Handler`] implementations, one per supported operation.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

#[cfg(test)]
mod spec {
    use std::future::{self, Future};

    use crate::operations::{By, Select};

    use super::Handler;

    struct Doubler;

    impl Handler<Select<By<u32, u32>>> for Doubler {
        type Ok = u32;
        type Err = ();

        fn execute(
            &self,
            Select(by): Select<By<u32, u32>>,
        ) -> impl Future<Output = Result<u32, ()>> {
            future::ready(by.into_inner().checked_mul(2).ok_or(()))
        }
    }

    #[tokio::test]
    async fn dispatches_by_operation() {
        assert_eq!(Doubler.execute(Select(By::new(21))).await, Ok(42));
        assert_eq!(Doubler.execute(Select(By::new(u32::MAX))).await, Err(()));
    }
}
