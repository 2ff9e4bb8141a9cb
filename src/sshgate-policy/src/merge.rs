//! Tag overlay merging.
//!
//! Overlays only ever add: a field the overlay leaves unset keeps the base
//! value, maps are unioned with the overlay winning on shared keys, and lists
//! are concatenated. Nothing is deduplicated, so applying the same overlay
//! twice repeats its list entries.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{ArgPolicy, Policy, Rule};

impl Policy {
    /// Layer `overlay` on top of this policy.
    ///
    /// Rules are identified by their `command` string alone; an overlay rule
    /// for a new command is appended after the existing ones. The overlay's
    /// own `keyTags` are ignored.
    pub fn merge(mut self, overlay: &Policy) -> Policy {
        override_flag(&mut self.show_terse_denied, overlay.show_terse_denied);
        override_flag(&mut self.show_denied, overlay.show_denied);
        override_flag(&mut self.show_allowed, overlay.show_allowed);
        override_flag(&mut self.expand_env_vars, overlay.expand_env_vars);
        override_flag(&mut self.enable_logging, overlay.enable_logging);

        override_text(&mut self.log_file, &overlay.log_file);
        override_text(&mut self.use_shell, &overlay.use_shell);
        override_text(&mut self.help_text, &overlay.help_text);

        union_map(&mut self.set_env_vars, &overlay.set_env_vars);

        for rule in &overlay.allowed_commands {
            match self
                .allowed_commands
                .iter_mut()
                .find(|existing| existing.command == rule.command)
            {
                Some(existing) => existing.absorb(rule),
                None => self.allowed_commands.push(rule.clone()),
            }
        }

        self
    }

    /// Apply the overlays named by `tags`, in the order given.
    ///
    /// Tags without a matching `keyTags` entry are skipped.
    pub fn with_tags<S: AsRef<str>>(&self, tags: &[S]) -> Policy {
        tags.iter().fold(self.clone(), |policy, tag| {
            let tag = tag.as_ref();
            match self.key_tags.get(tag) {
                Some(overlay) => {
                    debug!(tag, "Applying tag overlay");
                    policy.merge(overlay)
                }
                None => {
                    debug!(tag, "No overlay declared for tag");
                    policy
                }
            }
        })
    }
}

impl Rule {
    /// Fold another rule for the same command into this one.
    fn absorb(&mut self, other: &Rule) {
        if let Some(extra) = &other.args {
            let args = self.args.get_or_insert_with(ArgPolicy::default);
            args.forbidden.extend(extra.forbidden.iter().cloned());
            args.allowed.extend(extra.allowed.iter().cloned());
        }
        union_map(&mut self.replace, &other.replace);
        union_map(&mut self.set_env_vars, &other.set_env_vars);
        self.must_match.extend(other.must_match.iter().cloned());
    }
}

fn override_flag(base: &mut Option<bool>, overlay: Option<bool>) {
    if overlay.is_some() {
        *base = overlay;
    }
}

fn override_text(base: &mut Option<String>, overlay: &Option<String>) {
    if let Some(value) = overlay.as_ref().filter(|v| !v.is_empty()) {
        *base = Some(value.clone());
    }
}

fn union_map(base: &mut IndexMap<String, String>, overlay: &IndexMap<String, String>) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}
