//! Tab names and icons derived from what a tab shows.

use crate::content::{BlockId, ContentId};
use crate::host::{Block, ContentBackend};
use tabsman_config::Config;

/// Block kinds whose label comes from their alias or text.
const TEXTUAL_KINDS: [&str; 5] = ["ul", "ol", "text", "heading", "task"];

/// Characters of block text kept in a tab name.
const NAME_TEXT_LIMIT: usize = 30;

const JOURNAL_ICON: &str = "ti ti-calendar-smile";
const ALIAS_ICON: &str = "ti ti-file";
const TAG_ICON: &str = "ti ti-hash";

/// A tab's display name and icon class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    pub name: String,
    pub icon: String,
}

impl TabLabel {
    pub fn fallback(config: &Config) -> Self {
        Self {
            name: config.default_tab_name.clone(),
            icon: config.default_tab_icon.clone(),
        }
    }
}

/// Describe `content` for display.
///
/// Never fails: backend errors and missing blocks fall back to the configured
/// default name and icon.
pub fn describe<B: ContentBackend + ?Sized>(
    content: Option<&ContentId>,
    backend: &B,
    config: &Config,
) -> TabLabel {
    match content {
        None | Some(ContentId::Plugin(_)) => TabLabel::fallback(config),
        Some(ContentId::Journal(date)) => TabLabel {
            name: date.format("%a %b %d %Y").to_string(),
            icon: JOURNAL_ICON.to_string(),
        },
        Some(ContentId::Block(id)) => match describe_block(*id, backend, config) {
            Ok(label) => label,
            Err(e) => {
                crate::debug_error!("NAMING", "failed to describe block {}: {:#}", id, e);
                TabLabel::fallback(config)
            }
        },
    }
}

fn describe_block<B: ContentBackend + ?Sized>(
    id: BlockId,
    backend: &B,
    config: &Config,
) -> anyhow::Result<TabLabel> {
    let Some(block) = backend.get_block(id)? else {
        return Ok(TabLabel::fallback(config));
    };
    let Some(repr) = block.repr.as_ref().filter(|r| !r.kind.is_empty()) else {
        return Ok(TabLabel::fallback(config));
    };

    let kind = repr.kind.as_str();
    let name = if TEXTUAL_KINDS.contains(&kind) {
        textual_name(&block, kind)
    } else {
        format!("({kind})")
    };

    let mut icon = kind_icon(kind, repr.level).to_string();

    // A block with aliases is either the alias's own page or a tag reference.
    if let Some(alias) = block.aliases.first() {
        let named = backend.get_aliased_blocks(alias)?;
        icon = if named.contains(&block.id) {
            ALIAS_ICON.to_string()
        } else {
            TAG_ICON.to_string()
        };
    }

    Ok(TabLabel { name, icon })
}

fn textual_name(block: &Block, kind: &str) -> String {
    let show_alias = !block.aliases.is_empty() && block.as_alias.unwrap_or(true);
    if show_alias {
        return block.aliases[0].clone();
    }
    match block.text.as_deref() {
        Some(text) if !text.is_empty() => {
            let mut name: String = text.chars().take(NAME_TEXT_LIMIT).collect();
            if text.chars().count() > NAME_TEXT_LIMIT {
                name.push_str("...");
            }
            name
        }
        _ => format!("({kind})"),
    }
}

fn kind_icon(kind: &str, level: Option<u8>) -> &'static str {
    match kind {
        "heading" => match level.unwrap_or(1) {
            1 => "ti ti-h-1",
            2 => "ti ti-h-2",
            3 => "ti ti-h-3",
            4 => "ti ti-h-4",
            _ => "ti ti-cube",
        },
        "ul" => "ti ti-list",
        "ol" => "ti ti-list-numbers",
        "task" => "ti ti-checkbox",
        "code" => "ti ti-code",
        "quote2" => "ti ti-blockquote",
        "image" => "ti ti-photo",
        "video" => "ti ti-movie",
        "whiteboard" => "ti ti-chalkboard",
        _ => "ti ti-cube",
    }
}
