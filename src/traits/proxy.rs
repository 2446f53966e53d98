use crate::Result;

/// Contract for values that defer their setup until first needed.
pub trait Proxy {
    /// Performs the deferred setup. Calling it again on an initialized proxy should be a no-op.
    fn initialize(&mut self) -> Result<()>;

    fn is_initialized(&self) -> bool;
}
