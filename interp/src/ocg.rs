//! Optional content (layer) visibility.
use crate::{
    object::{Dictionary, Name, Object, ObjectId, Resolver},
    option::Usage,
};
use log::debug;
use std::str::FromStr;
use strum::EnumString;

/// Optional content configuration of the document, from `OCProperties/D`
/// or the configuration selected by the caller.
#[derive(Debug, Clone, Default)]
pub struct OcgConfig {
    /// States of groups in configuration order, unlisted groups are on.
    states: Vec<(ObjectId, bool)>,
    /// Intents of configuration, None for the default intent `View`.
    intent: Option<Vec<Name>>,
}

impl OcgConfig {
    pub fn new(states: Vec<(ObjectId, bool)>, intent: Option<Vec<Name>>) -> Self {
        Self { states, intent }
    }

    pub fn is_on(&self, id: ObjectId) -> bool {
        self.states
            .iter()
            .find(|(i, _)| *i == id)
            .map_or(true, |(_, on)| *on)
    }

    /// Intent of a group is honored by this configuration.
    pub fn intent_includes(&self, name: &str) -> bool {
        if name == "All" {
            return true;
        }
        match &self.intent {
            None => name == "View",
            Some(intents) => intents
                .iter()
                .any(|i| i.as_str() == "All" || i.as_str() == name),
        }
    }
}

/// Visibility policy of optional content membership dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
enum VisibilityPolicy {
    #[default]
    AnyOn,
    AllOn,
    AnyOff,
    AllOff,
}

/// Decides whether content belonging to an optional content group or
/// membership dictionary is hidden.
pub struct OcgEvaluator<'a, R: ?Sized> {
    resolver: &'a R,
    config: Option<&'a OcgConfig>,
    usage: Usage,
}

impl<'a, R: Resolver + ?Sized> OcgEvaluator<'a, R> {
    pub fn new(resolver: &'a R, config: Option<&'a OcgConfig>, usage: Usage) -> Self {
        Self {
            resolver,
            config,
            usage,
        }
    }

    /// Content marked by `Properties` resource `name` is hidden.
    pub fn is_hidden_name(&self, properties: Option<&Dictionary>, name: &str) -> bool {
        if self.config.is_none() {
            return false;
        }
        properties.map_or(false, |p| self.is_hidden(p.get_or_null(name)))
    }

    /// `obj` is an OCG or OCMD, direct or reference. Anything else is visible.
    pub fn is_hidden(&self, obj: &Object) -> bool {
        let mut visiting = vec![];
        self.is_hidden_inner(obj, &mut visiting)
    }

    fn is_hidden_inner(&self, obj: &Object, visiting: &mut Vec<ObjectId>) -> bool {
        let Some(config) = self.config else {
            return false;
        };
        let id = obj.as_reference();
        if let Some(id) = id {
            if visiting.contains(&id) {
                debug!("optional content membership loops back to {:?}", id);
                return false;
            }
        }
        let Ok(dict) = self.resolver.resolve(obj).as_dict() else {
            return false;
        };

        match dict.get_name("Type").map(|n| n.as_str()) {
            Some("OCG") => self.is_ocg_hidden(config, id, dict),
            Some("OCMD") => {
                if let Some(id) = id {
                    visiting.push(id);
                }
                let r = self.is_ocmd_hidden(dict, visiting);
                if id.is_some() {
                    visiting.pop();
                }
                r
            }
            _ => false,
        }
    }

    fn is_ocg_hidden(&self, config: &OcgConfig, id: Option<ObjectId>, dict: &Dictionary) -> bool {
        if id.is_some_and(|id| !config.is_on(id)) {
            return true;
        }

        let intent_included = match self.resolver.get(dict, "Intent") {
            Object::Name(n) => config.intent_includes(n),
            Object::Array(arr) => arr
                .iter()
                .filter_map(|o| self.resolver.resolve(o).as_name().ok())
                .any(|n| config.intent_includes(n)),
            _ => config.intent_includes("View"),
        };
        if !intent_included {
            return true;
        }

        let usage = self.usage.to_string();
        self.resolver
            .get_dict(dict, "Usage")
            .and_then(|u| self.resolver.get_dict(u, &usage))
            .and_then(|u| {
                self.resolver
                    .get(u, &format!("{}State", usage))
                    .as_name()
                    .ok()
            })
            .is_some_and(|state| state.as_str() == "OFF")
    }

    fn is_ocmd_hidden(&self, dict: &Dictionary, visiting: &mut Vec<ObjectId>) -> bool {
        // visibility expressions are not evaluated
        if matches!(self.resolver.get(dict, "VE"), Object::Array(_)) {
            return false;
        }

        let policy = dict
            .get_name("P")
            .and_then(|p| VisibilityPolicy::from_str(p.as_str()).ok())
            .unwrap_or_default();
        let ocgs = dict.get_or_null("OCGs");
        let members: Vec<&Object> = match self.resolver.resolve(ocgs) {
            Object::Array(arr) => arr.iter().collect(),
            Object::Dictionary(_) => vec![ocgs],
            _ => return false,
        };
        let mut hidden = members.iter().map(|o| self.is_hidden_inner(o, visiting));
        let visible = match policy {
            VisibilityPolicy::AnyOn => hidden.any(|h| !h),
            VisibilityPolicy::AllOn => hidden.all(|h| !h),
            VisibilityPolicy::AnyOff => hidden.any(|h| h),
            VisibilityPolicy::AllOff => hidden.all(|h| h),
        };
        !visible
    }
}
