//! Rule cascade used when the corpus has no match.
//!
//! A cascade is an ordered list of [`Rule`]s followed by a mandatory
//! terminal [`Responder`]. Rules are tried in order and the first one that
//! fires produces the reply; the terminal responder answers everything
//! else, so the cascade always yields a response.
//!
//! Keyword lists, ordering and reply texts are plain data
//! ([`FallbackRules`]) so deployments can change them from configuration.
//! [`FallbackRules::default`] is the built-in Persian cascade:
//!
//! | Order | Rule | Trigger |
//! |-------|------|---------|
//! | 1 | `greeting` | a greeting word or phrase |
//! | 2 | `farewell` | a farewell word or phrase |
//! | 3 | `code` | a programming keyword token |
//! | 4 | `question` | trailing `?`/`؟` or an interrogative token |
//! | 5 | `analysis` | an analyze/understand token |
//! | - | terminal | random subject + verb + object sentence |

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::normalize::normalize;
use crate::random::RandomSource;
use crate::tokenize::split_normalized;

/// Name reported for replies produced by the terminal responder.
pub const TERMINAL_RULE: &str = "terminal";

/// Placeholder replaced by the representative keyword in templates.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

/// How a rule's keywords are compared against the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The keyword occurs anywhere in the normalized text.
    #[default]
    Substring,
    /// The keyword's tokens appear as consecutive input tokens, so
    /// `صبح بخیر` matches as a phrase and `درود` does not fire inside `بدرود`.
    Token,
}

/// How a fired rule builds its reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Responder {
    /// A constant reply.
    Fixed { text: String },
    /// A template with `{keyword}` replaced by the first token of the input.
    Keyword { template: String },
    /// `<subject> <verb> <object>.` with each part drawn at random.
    Grammar {
        subjects: Vec<String>,
        verbs: Vec<String>,
        objects: Vec<String>,
    },
    /// One reply drawn at random.
    Pick { choices: Vec<String> },
}

/// One step of the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
    /// Suffixes checked against the raw input (trailing whitespace ignored).
    #[serde(default)]
    pub ends_with: Vec<String>,
    pub reply: Responder,
}

/// Configurable cascade description: ordered rules plus the terminal reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FallbackRules {
    #[serde(default = "default_rules")]
    pub rules: Vec<Rule>,
    #[serde(default = "default_terminal")]
    pub terminal: Responder,
}

impl Default for FallbackRules {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            terminal: default_terminal(),
        }
    }
}

impl FallbackRules {
    /// Reject rules that can never fire and random responders with nothing to pick.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                bail!("fallback rule names must not be empty");
            }
            if rule.name == TERMINAL_RULE {
                bail!("fallback rule name '{}' is reserved", TERMINAL_RULE);
            }
            let has_keyword = !compile_keywords(&rule.keywords, rule.match_mode).is_empty();
            let has_suffix = rule.ends_with.iter().any(|s| !s.is_empty());
            if !has_keyword && !has_suffix {
                bail!(
                    "fallback rule '{}' needs at least one keyword or ends_with suffix",
                    rule.name
                );
            }
            rule.reply
                .validate()
                .map_err(|e| anyhow::anyhow!("fallback rule '{}': {}", rule.name, e))?;
        }
        self.terminal
            .validate()
            .map_err(|e| anyhow::anyhow!("fallback terminal: {}", e))
    }
}

impl Responder {
    fn validate(&self) -> Result<()> {
        match self {
            Responder::Fixed { .. } => {}
            Responder::Keyword { template } => {
                if !template.contains(KEYWORD_PLACEHOLDER) {
                    bail!("keyword template must contain {}", KEYWORD_PLACEHOLDER);
                }
            }
            Responder::Grammar {
                subjects,
                verbs,
                objects,
            } => {
                if subjects.is_empty() || verbs.is_empty() || objects.is_empty() {
                    bail!("grammar responder needs non-empty subjects, verbs and objects");
                }
            }
            Responder::Pick { choices } => {
                if choices.is_empty() {
                    bail!("pick responder needs at least one choice");
                }
            }
        }
        Ok(())
    }

    /// Produce the reply text for `utterance`.
    pub fn render(&self, utterance: &Utterance<'_>, random: &dyn RandomSource) -> String {
        match self {
            Responder::Fixed { text } => text.clone(),
            Responder::Keyword { template } => {
                template.replace(KEYWORD_PLACEHOLDER, utterance.keyword())
            }
            Responder::Grammar {
                subjects,
                verbs,
                objects,
            } => format!(
                "{} {} {}.",
                choose(subjects, random),
                choose(verbs, random),
                choose(objects, random)
            ),
            Responder::Pick { choices } => choose(choices, random).to_string(),
        }
    }
}

fn choose<'a>(items: &'a [String], random: &dyn RandomSource) -> &'a str {
    if items.is_empty() {
        return "";
    }
    let i = random.pick(items.len()).min(items.len() - 1);
    &items[i]
}

/// The three views of one input that rules inspect.
#[derive(Debug, Clone, Copy)]
pub struct Utterance<'a> {
    pub raw: &'a str,
    pub normalized: &'a str,
    pub tokens: &'a [String],
}

impl<'a> Utterance<'a> {
    /// Representative keyword: the first non-empty of the first two tokens.
    pub fn keyword(&self) -> &'a str {
        self.tokens
            .iter()
            .take(2)
            .find(|t| !t.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Keywords in the form the match mode compares against.
#[derive(Debug, Clone)]
enum Keywords {
    Substring(Vec<String>),
    Token(Vec<Vec<String>>),
}

impl Keywords {
    fn is_empty(&self) -> bool {
        match self {
            Keywords::Substring(k) => k.is_empty(),
            Keywords::Token(k) => k.is_empty(),
        }
    }
}

fn compile_keywords(keywords: &[String], mode: MatchMode) -> Keywords {
    let normalized = keywords.iter().map(|k| normalize(k)).filter(|k| !k.is_empty());
    match mode {
        MatchMode::Substring => Keywords::Substring(normalized.collect()),
        MatchMode::Token => Keywords::Token(
            normalized
                .map(|k| split_normalized(&k))
                .filter(|phrase| !phrase.is_empty())
                .collect(),
        ),
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    keywords: Keywords,
    ends_with: Vec<String>,
    reply: Responder,
}

impl CompiledRule {
    fn fires(&self, u: &Utterance<'_>) -> bool {
        let raw = u.raw.trim_end();
        if self.ends_with.iter().any(|s| raw.ends_with(s.as_str())) {
            return true;
        }
        match &self.keywords {
            Keywords::Substring(keywords) => {
                keywords.iter().any(|k| u.normalized.contains(k.as_str()))
            }
            Keywords::Token(phrases) => phrases
                .iter()
                .any(|phrase| u.tokens.windows(phrase.len()).any(|w| w == phrase.as_slice())),
        }
    }
}

/// A compiled, ready-to-run cascade.
#[derive(Debug, Clone)]
pub struct Cascade {
    rules: Vec<CompiledRule>,
    terminal: Responder,
}

impl Cascade {
    /// Validate `config` and normalize its keywords (split into phrases in token mode).
    pub fn new(config: FallbackRules) -> Result<Self> {
        config.validate()?;
        let rules = config
            .rules
            .into_iter()
            .map(|r| CompiledRule {
                name: r.name,
                keywords: compile_keywords(&r.keywords, r.match_mode),
                ends_with: r.ends_with.into_iter().filter(|s| !s.is_empty()).collect(),
                reply: r.reply,
            })
            .collect();
        Ok(Self {
            rules,
            terminal: config.terminal,
        })
    }

    /// Run the cascade. Returns the name of the rule that answered and the reply.
    pub fn respond<'c>(
        &'c self,
        utterance: &Utterance<'_>,
        random: &dyn RandomSource,
    ) -> (&'c str, String) {
        for rule in &self.rules {
            if rule.fires(utterance) {
                return (rule.name.as_str(), rule.reply.render(utterance, random));
            }
        }
        (TERMINAL_RULE, self.terminal.render(utterance, random))
    }
}

impl Default for Cascade {
    fn default() -> Self {
        // The built-in rules are validated by the tests below.
        let config = FallbackRules::default();
        Self::new(config.clone()).unwrap_or(Self {
            rules: Vec::new(),
            terminal: config.terminal,
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fixed reply of the built-in `code` rule.
pub const CODE_OFFER: &str = "می‌تونم نمونه کد برات تولید کنم — بگو به چه زبان و چه کاری.";

/// Template of the built-in `question` rule.
pub const QUESTION_TEMPLATE: &str = "سوال خوبی پرسیدی دربارهٔ \"{keyword}\".";

fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "greeting".to_string(),
            keywords: strings(&["سلام", "درود", "صبح بخیر", "عصر بخیر", "hello", "hi"]),
            match_mode: MatchMode::Token,
            ends_with: Vec::new(),
            reply: Responder::Fixed {
                text: "سلام! خوشحالم که اینجایی. چطور می‌تونم کمکت کنم؟".to_string(),
            },
        },
        Rule {
            name: "farewell".to_string(),
            keywords: strings(&["خداحافظ", "خدانگهدار", "بدرود", "فعلا", "بای", "bye"]),
            match_mode: MatchMode::Token,
            ends_with: Vec::new(),
            reply: Responder::Fixed {
                text: "خدانگهدار! هر وقت خواستی برگرد.".to_string(),
            },
        },
        Rule {
            name: "code".to_string(),
            keywords: strings(&[
                "کد",
                "کدنویسی",
                "برنامه",
                "برنامه‌نویسی",
                "js",
                "javascript",
                "جاوااسکریپت",
                "python",
                "پایتون",
                "html",
                "css",
                "rust",
                "تابع",
                "فانکشن",
            ]),
            match_mode: MatchMode::Token,
            ends_with: Vec::new(),
            reply: Responder::Fixed {
                text: CODE_OFFER.to_string(),
            },
        },
        Rule {
            name: "question".to_string(),
            keywords: strings(&["چطور", "چگونه", "چیه", "چه", "کجا", "کی", "چرا", "آیا"]),
            match_mode: MatchMode::Token,
            ends_with: strings(&["?", "؟"]),
            reply: Responder::Keyword {
                template: QUESTION_TEMPLATE.to_string(),
            },
        },
        Rule {
            name: "analysis".to_string(),
            keywords: strings(&["تحلیل", "بفهم", "بفهمی", "analyze", "understand"]),
            match_mode: MatchMode::Token,
            ends_with: Vec::new(),
            reply: Responder::Fixed {
                text: "بذار دقیق‌تر بررسیش کنم؛ کمی بیشتر توضیح بده تا بهتر تحلیلش کنم."
                    .to_string(),
            },
        },
    ]
}

fn default_terminal() -> Responder {
    Responder::Grammar {
        subjects: strings(&["من", "تو", "او", "ما", "شما", "آنها"]),
        verbs: strings(&[
            "می‌فهمم",
            "می‌دانم",
            "می‌توانم",
            "تحلیل می‌کنم",
            "کمک می‌کنم",
            "می‌سازم",
        ]),
        objects: strings(&[
            "موضوعت را",
            "جمله‌ات را",
            "درخواستت را",
            "نیازت را",
            "ایده‌ات را",
        ]),
    }
}
