//! Parse stages and the transition table of the result-page state machine.
//!
//! The site renders each search hit as one `<tr>` with three cells:
//!
//! ```text
//! <tr>
//!   <td>..category icon..</td>
//!   <td>
//!     <a class="ttorr-title" href="{desc_link}">{name}</a>
//!     <div title="File Size">{size}</div>
//!     <div title="Seeders online">{seeds}</div>
//!     <div title="Leechers">{leech}</div>
//!   </td>
//!   <td><a href="{link}">..</a></td>
//! </tr>
//! ```
//!
//! Transitions are pure: they look only at the current stage, the tag name and
//! (for `a`/`div` start tags) the attribute list. Any event that does not match
//! a row of the table leaves the stage unchanged.

use super::tokenizer::TagAttribute;

/// `class` value marking the torrent title link in the second cell.
pub const DESC_LINK_CLASS: &str = "ttorr-title";
/// `title` of the size `<div>`.
pub const FILE_SIZE_TITLE: &str = "File Size";
/// `title` of the seeders `<div>`.
pub const SEEDERS_TITLE: &str = "Seeders online";
/// `title` of the leechers `<div>`.
pub const LEECHERS_TITLE: &str = "Leechers";

/// Where the parser is within the expected table/row/cell structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseStage {
    /// Nothing recognized yet.
    #[default]
    NotStarted,
    /// `<table>`
    TableStarted,
    /// `</table>`
    TableEnded,
    /// `<tr>`
    RowStarted,
    /// `</tr>`
    RowEnded,
    /// first `<td>`
    Col1Started,
    /// first `</td>`
    Col1Ended,
    /// second `<td>`
    Col2Started,
    /// second `</td>`
    Col2Ended,
    /// third `<td>`
    Col3Started,
    /// third `</td>`
    Col3Ended,
    /// title anchor inside the second cell
    DescLinkTag,
    /// size `<div>` inside the second cell
    FileSizeTag,
    /// seeders `<div>` inside the second cell
    SeedersTag,
    /// leechers `<div>` inside the second cell
    LeechersTag,
    /// download anchor inside the third cell
    LinkTag,
}

/// Side effect a transition asks the row accumulator to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Discard the in-progress row and start a fresh one.
    Reset,
    /// Set `desc_link` from this raw (unresolved) href.
    DescLink(String),
    /// Set `link` from this raw (unresolved) href.
    Link(String),
    /// Stamp `engine_url`, hand the row to the collector, start a fresh one.
    Complete,
}

/// Outcome of feeding one tag event to the stage machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Stage after the event.
    pub stage: ParseStage,
    /// Row side effect, if the event triggers one.
    pub action: Option<RowAction>,
}

impl Transition {
    fn to(stage: ParseStage) -> Self {
        Self {
            stage,
            action: None,
        }
    }

    fn with(stage: ParseStage, action: RowAction) -> Self {
        Self {
            stage,
            action: Some(action),
        }
    }
}

impl ParseStage {
    /// Applies a start-tag event.
    #[must_use]
    pub fn on_start_tag(self, tag: &str, attrs: &[TagAttribute]) -> Transition {
        match tag {
            "table" => Transition::to(Self::TableStarted),
            "tr" => Transition::with(Self::RowStarted, RowAction::Reset),
            "td" => Transition::to(match self {
                Self::RowStarted => Self::Col1Started,
                Self::Col1Ended => Self::Col2Started,
                Self::Col2Ended => Self::Col3Started,
                other => other,
            }),
            "a" => match self {
                Self::Col2Started => desc_link_transition(attrs),
                Self::Col3Started => match attribute(attrs, "href") {
                    Some(href) => Transition::with(Self::LinkTag, RowAction::Link(href.to_string())),
                    None => Transition::to(Self::LinkTag),
                },
                other => Transition::to(other),
            },
            "div" if self == Self::Col2Started => Transition::to(
                match attribute(attrs, "title").unwrap_or_default() {
                    FILE_SIZE_TITLE => Self::FileSizeTag,
                    SEEDERS_TITLE => Self::SeedersTag,
                    LEECHERS_TITLE => Self::LeechersTag,
                    _ => self,
                },
            ),
            _ => Transition::to(self),
        }
    }

    /// Applies an end-tag event.
    #[must_use]
    pub fn on_end_tag(self, tag: &str) -> Transition {
        let next = match tag {
            "table" => Self::TableEnded,
            "tr" => return Transition::with(Self::RowEnded, RowAction::Complete),
            "a" => match self {
                Self::DescLinkTag => Self::Col2Started,
                Self::LinkTag => Self::Col3Started,
                other => other,
            },
            "div" => match self {
                Self::FileSizeTag | Self::SeedersTag | Self::LeechersTag => Self::Col2Started,
                other => other,
            },
            "td" => match self {
                Self::Col1Started => Self::Col1Ended,
                Self::Col2Started => Self::Col2Ended,
                Self::Col3Started => Self::Col3Ended,
                other => other,
            },
            _ => self,
        };
        Transition::to(next)
    }
}

// The href is only taken when the class marker is present on the same anchor;
// a plain `<a href>` in the second cell leaves both stage and row untouched.
// A marked anchor without href still records a desc_link (the bare site URL).
fn desc_link_transition(attrs: &[TagAttribute]) -> Transition {
    let marked = attrs
        .iter()
        .any(|attr| attr.name == "class" && attr.value == DESC_LINK_CLASS);
    if !marked {
        return Transition::to(ParseStage::Col2Started);
    }
    let href = attribute(attrs, "href").unwrap_or_default();
    Transition::with(
        ParseStage::DescLinkTag,
        RowAction::DescLink(href.to_string()),
    )
}

/// Value of the first attribute named `name`.
fn attribute<'a>(attrs: &'a [TagAttribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}
