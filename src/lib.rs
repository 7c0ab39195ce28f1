pub mod config;
pub mod coordinator;
pub mod duration;
pub mod events;
pub mod facade;
mod lock;
pub mod runtime;
pub mod style;
pub mod telemetry;
pub mod terminal_restore;
pub mod timer;
pub mod view;

pub(crate) use lock::lock_or_recover;
pub use config::{ConfigUpdate, HudConfig, Offset, Size};
pub use coordinator::{
    DismissCompletion, EnvironmentSignal, HudCoordinator, HudRequest, ImageSource,
};
pub use events::{EventBus, HudEvent, HudEventKind, Subscription, SubscriptionId};
pub use runtime::{spawn_hud, HudHandle};
pub use style::{AnimationType, Color, HudStyle, MaskBehavior, MaskType, Palette};
pub use view::{
    Appearance, AttachTarget, Content, FeedbackKind, HapticEvent, HudImage, HudView, Indicator,
    NullView, Placement, RingMetrics,
};
