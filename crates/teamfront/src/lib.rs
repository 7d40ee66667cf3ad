#![forbid(unsafe_code)]

//! teamfront public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use teamfront_core::{Result, WatchError};

pub mod prelude {
    pub use teamfront_core as core;
    pub use teamfront_web as web;

    pub use teamfront_core::config::WatchConfig;
    pub use teamfront_core::logo::{Logo, LogoSize};
    pub use teamfront_core::team::{
        CreateTeamData, InviteStatus, Team, TeamInvite, TeamMember, TeamRole, UserSummary,
    };
    pub use teamfront_core::visibility::{
        IntersectionRecord, ObservationRequest, OnIntersect, RootMargin, Threshold, Viewport,
        VisibilityWatcher, WatchHandle, WatchState,
    };
    #[cfg(target_arch = "wasm32")]
    pub use teamfront_web::DomViewport;
}
