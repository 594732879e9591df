/// Displays error messages to the operator. Fire and forget.
pub trait ErrorNotifier {
    fn show_errors(&self, errors: &[String]);
}

impl<N> ErrorNotifier for &N
where
    N: ErrorNotifier + ?Sized,
{
    fn show_errors(&self, errors: &[String]) {
        (**self).show_errors(errors);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl ErrorNotifier for TracingNotifier {
    fn show_errors(&self, errors: &[String]) {
        for error in errors {
            tracing::warn!(error = %error, "admin request rejected");
        }
    }
}
