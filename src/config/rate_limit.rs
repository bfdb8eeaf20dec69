use super::parse_bool_env;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Limits per route group: login/registration, anonymous reads and
/// everything a signed-in member does.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth: RateLimitRule,
    pub public: RateLimitRule,
    pub member: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: RateLimitRule::new(5, 10),
            public: RateLimitRule::new(30, 60),
            member: RateLimitRule::new(10, 30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    All,
    Auth,
    Public,
    Member,
}

impl Group {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auth" => Some(Self::Auth),
            "public" => Some(Self::Public),
            "member" | "members" => Some(Self::Member),
            _ => None,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self {
            enabled: parse_bool_env("RATE_LIMIT_ENABLED", true),
            ..Self::default()
        };

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            match parse_overrides(&raw) {
                Ok(overrides) => {
                    for (group, rule) in overrides {
                        cfg.set(group, rule);
                    }
                }
                Err(err) => tracing::warn!("Ignoring RATE_LIMIT_CONFIG '{}': {}", raw, err),
            }
        }

        cfg
    }

    fn set(&mut self, group: Group, rule: RateLimitRule) {
        match group {
            Group::All => {
                self.auth = rule;
                self.public = rule;
                self.member = rule;
            }
            Group::Auth => self.auth = rule,
            Group::Public => self.public = rule,
            Group::Member => self.member = rule,
        }
    }
}

/// Accepts either `per:burst` for every group, or a comma list such as
/// `auth=5:10,member=20:40`.
fn parse_overrides(raw: &str) -> Result<Vec<(Group, RateLimitRule)>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    if !trimmed.contains('=') {
        return Ok(vec![(Group::All, parse_rule(trimmed)?)]);
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (name, rule) = item
                .split_once('=')
                .ok_or_else(|| format!("expected group=per:burst, got '{}'", item))?;
            let group = Group::parse(name)
                .ok_or_else(|| format!("unknown group '{}' (auth, public, member)", name.trim()))?;
            Ok((group, parse_rule(rule.trim())?))
        })
        .collect()
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second, burst) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second.trim()))?;
    let burst_size: u32 = burst
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst.trim()))?;

    if per_second == 0 || burst_size == 0 {
        return Err("per_second and burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rule_applies_to_every_group() {
        let mut cfg = RateLimitConfig::default();
        for (group, rule) in parse_overrides("12:24").unwrap() {
            cfg.set(group, rule);
        }
        assert_eq!(cfg.auth, RateLimitRule::new(12, 24));
        assert_eq!(cfg.public, RateLimitRule::new(12, 24));
        assert_eq!(cfg.member, RateLimitRule::new(12, 24));
    }

    #[test]
    fn grouped_rules_only_touch_named_groups() {
        let mut cfg = RateLimitConfig::default();
        for (group, rule) in parse_overrides("auth=1:2, member=5:6").unwrap() {
            cfg.set(group, rule);
        }
        assert_eq!(cfg.auth, RateLimitRule::new(1, 2));
        assert_eq!(cfg.public, RateLimitConfig::default().public);
        assert_eq!(cfg.member, RateLimitRule::new(5, 6));
    }

    #[test]
    fn unknown_group_is_rejected() {
        let err = parse_overrides("offers=1:2").unwrap_err();
        assert!(err.contains("unknown group"));
    }

    #[test]
    fn zero_burst_is_rejected() {
        assert!(parse_overrides("auth=3:0").is_err());
    }
}
