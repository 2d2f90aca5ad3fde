#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Loaded,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Load,
    Recolor,
    Randomize,
    Resize,
    Clear,
    Render,
    Dispose,
}

/// What a state allows an operation to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Run,
    /// Valid but nothing to do (e.g. recolor with no image).
    Skip,
    NotInitialized,
    Disposed,
}

impl SessionState {
    pub fn gate(self, op: Operation) -> Gate {
        use Operation::*;
        use SessionState::*;
        match (self, op) {
            (Disposed, Dispose) => Gate::Skip,
            (Disposed, _) => Gate::Disposed,

            (Uninitialized, Init | Dispose) => Gate::Run,
            (Uninitialized, Load) => Gate::NotInitialized,
            (Uninitialized, Resize) => Gate::Run,
            (Uninitialized, _) => Gate::Skip,

            (Ready | Loaded, Init) => Gate::Skip,
            (Ready, Recolor | Randomize | Clear) => Gate::Skip,
            (Ready | Loaded, _) => Gate::Run,
        }
    }
}
