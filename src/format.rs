//! Telegram MarkdownV2 rendering.
//!
//! Every piece of text that reaches the chat as MarkdownV2 is built here, so
//! escaping happens in exactly one place and exactly once per value.

use chrono::{DateTime, Utc};
use teloxide::utils::markdown;

use crate::player::{
    field, BasicInfo, CaptainInfo, ClanInfo, CreditScoreInfo, PetInfo, PlayerRecord, SocialInfo,
    DEFAULT_ID, DEFAULT_NUMBER, DEFAULT_TEXT,
};

const EMPHASIS_CHARS: &[char] = &['*', '_', '~', '`', '|'];

pub const LOOKUP_COMMAND_USAGE: &str = "/get {region} {uid}";
const LOOKUP_COMMAND_EXAMPLE: &str = "/get ind 10000001";
const ATTRIBUTION: &str = "⚡ Free Fire Info Bot";

/// Turn rendered MarkdownV2 back into plain text.
///
/// Escaped characters keep their literal value; unescaped emphasis and code
/// span markers are dropped.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            c if EMPHASIS_CHARS.contains(&c) => {}
            c => out.push(c),
        }
    }
    out
}

// ── Fixed replies ──────────────────────────────────────────────────────────────

pub fn help_text() -> String {
    format!(
        "🥳 {}\n\n🚀 Use command:\n`{}`\n\n🎮 Example:\n`{}`",
        markdown::bold(&markdown::escape("Free Fire Player Info Bot")),
        markdown::escape(LOOKUP_COMMAND_USAGE),
        markdown::escape(LOOKUP_COMMAND_EXAMPLE),
    )
}

pub fn unknown_command_text() -> String {
    markdown::escape("❓ Unknown command. Send /help to see what I can do.")
}

pub fn usage_error_text() -> String {
    format!("❌ Usage: `{}`", markdown::escape(LOOKUP_COMMAND_USAGE))
}

pub fn invalid_uid_text() -> String {
    markdown::escape("❌ Invalid UID. The UID must contain digits only.")
}

pub fn placeholder_text() -> String {
    markdown::escape("⏳ Fetching Free Fire Account Info...")
}

/// Wrap a user-facing error message for delivery as MarkdownV2.
pub fn error_text(message: &str) -> String {
    markdown::escape(message)
}

// ── Player report ──────────────────────────────────────────────────────────────

struct Section {
    title: &'static str,
    lines: Vec<(&'static str, String)>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            lines: Vec::new(),
        }
    }

    fn line(mut self, label: &'static str, value: &str) -> Self {
        self.lines.push((label, format!("`{}`", markdown::escape(value))));
        self
    }

    fn render(&self) -> String {
        let mut out = self.title.to_string();
        for (label, value) in &self.lines {
            out.push_str(&format!("\n• {label}: {value}"));
        }
        out
    }
}

/// Render a player record as a MarkdownV2 report.
///
/// Pure: the same record and timestamp always produce the same text.
pub fn format_report(record: &PlayerRecord, generated_at: DateTime<Utc>) -> String {
    let mut sections = vec![basic_section(&record.basic)];
    if let Some(clan) = &record.clan {
        sections.push(clan_section(clan));
    }
    if let Some(captain) = &record.captain {
        sections.push(captain_section(captain));
    }
    if let Some(pet) = &record.pet {
        sections.push(pet_section(pet));
    }
    if let Some(credit) = &record.credit {
        sections.push(credit_section(credit));
    }
    sections.push(social_section(&record.social));

    let mut parts: Vec<String> = sections.iter().map(Section::render).collect();
    parts.push(footer(generated_at));
    parts.join("\n\n")
}

fn basic_section(b: &BasicInfo) -> Section {
    Section::new("👤 *Basic Info*")
        .line("Name", field(&b.nickname, DEFAULT_ID))
        .line("UID", field(&b.account_id, DEFAULT_ID))
        .line("Region", field(&b.region, DEFAULT_ID))
        .line("Level", field(&b.level, DEFAULT_NUMBER))
        .line("Likes", field(&b.liked, DEFAULT_NUMBER))
        .line("EXP", field(&b.exp, DEFAULT_NUMBER))
        .line("BR Rank", field(&b.br_rank, DEFAULT_NUMBER))
        .line("CS Rank", field(&b.cs_rank, DEFAULT_NUMBER))
        .line("Max BR", field(&b.br_max_rank, DEFAULT_NUMBER))
        .line("Max CS", field(&b.cs_max_rank, DEFAULT_NUMBER))
        .line("Title ID", field(&b.title, DEFAULT_ID))
        .line("Banner ID", field(&b.banner_id, DEFAULT_ID))
        .line("Avatar ID", field(&b.head_pic, DEFAULT_ID))
        .line("Version", field(&b.release_version, DEFAULT_ID))
}

fn clan_section(c: &ClanInfo) -> Section {
    let members = format!(
        "{}/{}",
        field(&c.member_num, DEFAULT_NUMBER),
        field(&c.capacity, DEFAULT_NUMBER)
    );
    Section::new("🛡️ *Guild Info*")
        .line("Name", field(&c.clan_name, DEFAULT_TEXT))
        .line("ID", field(&c.clan_id, DEFAULT_ID))
        .line("Level", field(&c.clan_level, DEFAULT_NUMBER))
        .line("Members", &members)
        .line("Captain UID", field(&c.captain_id, DEFAULT_ID))
}

fn captain_section(c: &CaptainInfo) -> Section {
    Section::new("👑 *Guild Captain*")
        .line("Name", field(&c.nickname, DEFAULT_ID))
        .line("UID", field(&c.account_id, DEFAULT_ID))
        .line("Region", field(&c.region, DEFAULT_ID))
        .line("Level", field(&c.level, DEFAULT_NUMBER))
        .line("Likes", field(&c.liked, DEFAULT_NUMBER))
        .line("BR Rank", field(&c.br_rank, DEFAULT_NUMBER))
        .line("CS Rank", field(&c.cs_rank, DEFAULT_NUMBER))
        .line("BR Points", field(&c.br_ranking_points, DEFAULT_NUMBER))
        .line("CS Points", field(&c.cs_ranking_points, DEFAULT_NUMBER))
}

fn pet_section(p: &PetInfo) -> Section {
    Section::new("🐾 *Pet Info*")
        .line("Pet ID", field(&p.id, DEFAULT_ID))
        .line("Level", field(&p.level, DEFAULT_NUMBER))
        .line("EXP", field(&p.exp, DEFAULT_NUMBER))
        .line("Skin ID", field(&p.skin_id, DEFAULT_ID))
        .line("Skill ID", field(&p.selected_skill_id, DEFAULT_ID))
}

fn credit_section(c: &CreditScoreInfo) -> Section {
    let summary = format!(
        "{} to {}",
        field(&c.periodic_summary_start_time, DEFAULT_ID),
        field(&c.periodic_summary_end_time, DEFAULT_ID)
    );
    Section::new("⭐ *Credit Score*")
        .line("Score", field(&c.credit_score, DEFAULT_NUMBER))
        .line("Summary", &summary)
        .line("Reward State", field(&c.reward_state, DEFAULT_ID))
}

fn social_section(s: &SocialInfo) -> Section {
    Section::new("📱 *Social*")
        .line("BR Public", field(&s.br_rank_show, DEFAULT_ID))
        .line("CS Public", field(&s.cs_rank_show, DEFAULT_ID))
        .line("Bio", field(&s.signature, DEFAULT_TEXT))
}

fn footer(generated_at: DateTime<Utc>) -> String {
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    format!(
        "🕒 Updated: `{}`\n{}",
        markdown::escape(&stamp),
        markdown::escape(ATTRIBUTION)
    )
}
