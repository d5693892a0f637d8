/// Remembers the page a user was on before being sent to sign in.
///
/// Reading does not clear the target; callers consume it with
/// `take_redirect_from` or clear it explicitly, otherwise it stays around.
#[derive(Debug, Clone, Default)]
pub struct NavigationStore {
    redirect_from: Option<String>,
}

impl NavigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect_from(&self) -> Option<&str> {
        self.redirect_from.as_deref()
    }

    /// Absent and empty page identifiers both normalize to `None`.
    pub fn set_redirect_from(&mut self, page: Option<&str>) {
        self.redirect_from = page.filter(|p| !p.is_empty()).map(str::to_string);
    }

    pub fn clear_redirect_from(&mut self) {
        self.redirect_from = None;
    }

    pub fn take_redirect_from(&mut self) -> Option<String> {
        self.redirect_from.take()
    }
}
