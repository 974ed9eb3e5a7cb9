/// Foreign environments the generator can emit glue code for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Opaque-handle wrapper source routed through a per-class dispatcher.
    Shim,
    /// Dynamic proxy scripts that dispatch overloads by argument count.
    ProxyScript,
    /// Coupled declaration/implementation files for a target without
    /// native overloading or templates.
    DeclImpl,
}

pub const ALL_BACKENDS: &[Backend] = &[Backend::Shim, Backend::ProxyScript, Backend::DeclImpl];

impl Backend {
    pub fn is_shim(&self) -> bool {
        matches!(self, Backend::Shim)
    }

    pub fn is_proxy_script(&self) -> bool {
        matches!(self, Backend::ProxyScript)
    }

    pub fn is_decl_impl(&self) -> bool {
        matches!(self, Backend::DeclImpl)
    }

    /// Targets without native overloading need every overload beyond the
    /// first renamed to a distinct exported name.
    pub fn needs_overload_suffixes(&self) -> bool {
        self.is_decl_impl()
    }
}
