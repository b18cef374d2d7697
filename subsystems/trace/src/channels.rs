//! # Built-in Channels
//!
//! | Channel          | Kind    | Returns | Override variable             |
//! |------------------|---------|---------|-------------------------------|
//! | `ARABIC`         | message |         | `HELIX_TRACE_ARABIC`          |
//! | `BLOB`           | message |         | `HELIX_TRACE_BLOB`            |
//! | `CORETEXT`       | message |         | `HELIX_TRACE_CORETEXT`        |
//! | `DIRECTWRITE`    | message |         | `HELIX_TRACE_DIRECTWRITE`     |
//! | `FT`             | message |         | `HELIX_TRACE_FT`              |
//! | `GET_COVERAGE`   | message |         | `HELIX_TRACE_GET_COVERAGE`    |
//! | `OBJECT`         | message |         | `HELIX_TRACE_OBJECT`          |
//! | `SHAPE_PLAN`     | message |         | `HELIX_TRACE_SHAPE_PLAN`      |
//! | `UNISCRIBE`      | message |         | `HELIX_TRACE_UNISCRIBE`       |
//! | `APPLY`          | traced  | `bool`  | `HELIX_TRACE_APPLY`           |
//! | `CLOSURE`        | traced  | `()`    | `HELIX_TRACE_CLOSURE`         |
//! | `COLLECT_GLYPHS` | traced  | `()`    | `HELIX_TRACE_COLLECT_GLYPHS`  |
//! | `SANITIZE`       | traced  | `bool`  | `HELIX_TRACE_SANITIZE`        |
//! | `SERIALIZE`      | traced  | `bool`  | `HELIX_TRACE_SERIALIZE`       |
//! | `WOULD_APPLY`    | traced  | `bool`  | `HELIX_TRACE_WOULD_APPLY`     |
//! | `DISPATCH`       | traced  | any     | `HELIX_TRACE_DISPATCH`        |
//!
//! Unset overrides fall back to `HELIX_TRACE`. `DISPATCH` instead defaults to
//! the sum of the six traced channels above it, so it is on whenever any of
//! them is.

use crate::config::{resolve_level, CONFIG};
use crate::define_channel;
use crate::level::Channel;

// =============================================================================
// MESSAGE CHANNELS
// =============================================================================

define_channel!(
    /// Arabic shaper joining decisions
    pub Arabic = "ARABIC", CONFIG.channel_level(option_env!("HELIX_TRACE_ARABIC"))
);
define_channel!(
    /// Blob lifetime and sanitization
    pub Blob = "BLOB", CONFIG.channel_level(option_env!("HELIX_TRACE_BLOB"))
);
define_channel!(
    /// CoreText backend
    pub CoreText = "CORETEXT", CONFIG.channel_level(option_env!("HELIX_TRACE_CORETEXT"))
);
define_channel!(
    /// DirectWrite backend
    pub DirectWrite = "DIRECTWRITE", CONFIG.channel_level(option_env!("HELIX_TRACE_DIRECTWRITE"))
);
define_channel!(
    /// FreeType backend
    pub Ft = "FT", CONFIG.channel_level(option_env!("HELIX_TRACE_FT"))
);
define_channel!(
    /// Coverage table lookups
    pub GetCoverage = "GET_COVERAGE", CONFIG.channel_level(option_env!("HELIX_TRACE_GET_COVERAGE"))
);
define_channel!(
    /// Object reference counting
    pub Object = "OBJECT", CONFIG.channel_level(option_env!("HELIX_TRACE_OBJECT"))
);
define_channel!(
    /// Shape plan construction and caching
    pub ShapePlan = "SHAPE_PLAN", CONFIG.channel_level(option_env!("HELIX_TRACE_SHAPE_PLAN"))
);
define_channel!(
    /// Uniscribe backend
    pub Uniscribe = "UNISCRIBE", CONFIG.channel_level(option_env!("HELIX_TRACE_UNISCRIBE"))
);

// =============================================================================
// TRACED CHANNELS
// =============================================================================

define_channel!(
    /// Lookup application, returns `bool`
    pub Apply = "APPLY", CONFIG.channel_level(option_env!("HELIX_TRACE_APPLY"))
);
define_channel!(
    /// Glyph closure computation, returns `()`
    pub Closure = "CLOSURE", CONFIG.channel_level(option_env!("HELIX_TRACE_CLOSURE"))
);
define_channel!(
    /// Glyph collection, returns `()`
    pub CollectGlyphs = "COLLECT_GLYPHS", CONFIG.channel_level(option_env!("HELIX_TRACE_COLLECT_GLYPHS"))
);
define_channel!(
    /// Table sanitization, returns `bool`
    pub Sanitize = "SANITIZE", CONFIG.channel_level(option_env!("HELIX_TRACE_SANITIZE"))
);
define_channel!(
    /// Table serialization, returns `bool`
    pub Serialize = "SERIALIZE", CONFIG.channel_level(option_env!("HELIX_TRACE_SERIALIZE"))
);
define_channel!(
    /// Applicability checks, returns `bool`
    pub WouldApply = "WOULD_APPLY", CONFIG.channel_level(option_env!("HELIX_TRACE_WOULD_APPLY"))
);

/// Sum of the traced channels' thresholds
pub const TRACED_SUM: u32 = Apply::THRESHOLD
    .saturating_add(Closure::THRESHOLD)
    .saturating_add(CollectGlyphs::THRESHOLD)
    .saturating_add(Sanitize::THRESHOLD)
    .saturating_add(Serialize::THRESHOLD)
    .saturating_add(WouldApply::THRESHOLD);

define_channel!(
    /// Generic dispatch through any traced context
    pub Dispatch = "DISPATCH", resolve_level(option_env!("HELIX_TRACE_DISPATCH"), TRACED_SUM)
);

// =============================================================================
// CATALOGUE
// =============================================================================

/// How a channel is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Free-standing messages only
    Message,
    /// Scoped activations with a return record
    Traced,
}

/// One built-in channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Display name
    pub name: &'static str,
    /// Resolved threshold
    pub level: u32,
    /// Usage
    pub kind: ChannelKind,
}

impl ChannelInfo {
    const fn of<C: Channel>(kind: ChannelKind) -> Self {
        Self {
            name: C::NAME,
            level: C::LEVEL,
            kind,
        }
    }

    /// Whether this channel emits anything
    pub const fn is_enabled(&self) -> bool {
        self.level > 0
    }
}

/// Every built-in channel, message channels first
pub const CATALOGUE: [ChannelInfo; 16] = [
    ChannelInfo::of::<Arabic>(ChannelKind::Message),
    ChannelInfo::of::<Blob>(ChannelKind::Message),
    ChannelInfo::of::<CoreText>(ChannelKind::Message),
    ChannelInfo::of::<DirectWrite>(ChannelKind::Message),
    ChannelInfo::of::<Ft>(ChannelKind::Message),
    ChannelInfo::of::<GetCoverage>(ChannelKind::Message),
    ChannelInfo::of::<Object>(ChannelKind::Message),
    ChannelInfo::of::<ShapePlan>(ChannelKind::Message),
    ChannelInfo::of::<Uniscribe>(ChannelKind::Message),
    ChannelInfo::of::<Apply>(ChannelKind::Traced),
    ChannelInfo::of::<Closure>(ChannelKind::Traced),
    ChannelInfo::of::<CollectGlyphs>(ChannelKind::Traced),
    ChannelInfo::of::<Sanitize>(ChannelKind::Traced),
    ChannelInfo::of::<Serialize>(ChannelKind::Traced),
    ChannelInfo::of::<WouldApply>(ChannelKind::Traced),
    ChannelInfo::of::<Dispatch>(ChannelKind::Traced),
];

/// Find a built-in channel by name, ignoring ASCII case
pub fn lookup(name: &str) -> Option<&'static ChannelInfo> {
    CATALOGUE
        .iter()
        .find(|info| info.name.eq_ignore_ascii_case(name))
}

/// Log the resolved thresholds through the `log` facade
pub fn log_catalogue() {
    log::info!(
        "helix-trace: global level {}{}",
        CONFIG.debug,
        if CONFIG.forced_off { " (no-trace)" } else { "" }
    );
    for info in CATALOGUE.iter() {
        if info.is_enabled() {
            log::info!("helix-trace: {:<14} level {}", info.name, info.level);
        } else {
            log::debug!("helix-trace: {:<14} off", info.name);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
