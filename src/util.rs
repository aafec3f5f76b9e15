use std::fmt;

/// Wrap a closure into a value implementing `fmt::Display`.
///
/// Used by the various `display(..)` adapters that need to borrow a grammar
/// for symbol names while formatting.
pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct Displayed<F>(F);
    impl<F> fmt::Display for Displayed<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.0)(f)
        }
    }
    Displayed(f)
}
