//! Orchestration of path lookup, rewriting, and disambiguation.

use tracing::debug;

use super::error::InjectError;
use super::group::{GroupInstance, GroupPick, enumerate_instances, expand_template, pick_instance};
use super::insertion::Insertion;
use super::matcher::{Choice, Disambiguation, disambiguate, relevant_tokens};
use super::rewrite::rewrite_path;
use crate::config::{GeneratorConfig, HierarchicalGroupConfig};
use crate::parser::StructuralPath;
use crate::types::{TokenMap, XmlTargetSection};
use crate::xml::XmlQuery;

/// Where the decision could not be made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbiguityStage {
    /// Choosing an instance of a hierarchical group.
    Group { name: String },
    /// Choosing the element to insert into.
    Target,
}

/// Candidates offered to the caller when nothing was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub stage: AmbiguityStage,
    /// The path the candidates were found with.
    pub path: StructuralPath,
    pub candidates: Vec<XmlTargetSection>,
    /// Indices of candidates matching every relevant token.
    pub exact_matches: Vec<usize>,
    /// Every candidate, then [`Choice::Skip`].
    pub choices: Vec<Choice>,
}

/// The outcome of resolving one fragment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Selected {
        path: StructuralPath,
        target: XmlTargetSection,
    },
    Ambiguous(Ambiguity),
    /// The path matched no element.
    NoTarget { path: StructuralPath },
}

impl Resolution {
    /// The insertion for `content`, when a target was selected.
    pub fn plan(&self, content: &str) -> Option<Insertion> {
        match self {
            Resolution::Selected { target, .. } => Some(Insertion::plan(target, content)),
            Resolution::Ambiguous(_) | Resolution::NoTarget { .. } => None,
        }
    }
}

/// Explicit choices that override automatic selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Picks {
    pub group: Option<GroupPick>,
    /// Zero-based index into the target candidates.
    pub target: Option<usize>,
}

enum InstanceChoice {
    Chosen(GroupInstance),
    Report(Resolution),
}

/// Resolves injection targets for fragment keys against one document.
///
/// The document must not change while a resolver is in use: candidate
/// offsets describe the snapshot it was built from.
pub struct InjectionResolver<'a> {
    config: &'a GeneratorConfig,
    document: &'a dyn XmlQuery,
}

impl<'a> InjectionResolver<'a> {
    pub fn new(config: &'a GeneratorConfig, document: &'a dyn XmlQuery) -> Self {
        Self { config, document }
    }

    /// Resolve `key` for a line's tokens, selecting automatically.
    pub fn resolve(&self, key: &str, tokens: &TokenMap) -> Result<Resolution, InjectError> {
        self.resolve_with(key, tokens, &Picks::default())
    }

    /// Resolve `key`, honoring explicit picks where given.
    pub fn resolve_with(
        &self,
        key: &str,
        tokens: &TokenMap,
        picks: &Picks,
    ) -> Result<Resolution, InjectError> {
        let path = match self.config.group_for(key) {
            Some((group, template)) => {
                let instance = match self.choose_instance(group, tokens, picks)? {
                    InstanceChoice::Chosen(instance) => instance,
                    InstanceChoice::Report(resolution) => return Ok(resolution),
                };
                debug!(
                    group = %group.name,
                    instance = %instance.display_value,
                    "group instance chosen"
                );
                expand_template(group, &instance, template).map_err(|source| {
                    InjectError::Expansion {
                        group: group.name.clone(),
                        key: key.to_string(),
                        source,
                    }
                })?
            }
            None => self
                .config
                .injection_path(key)
                .cloned()
                .ok_or_else(|| InjectError::UnmappedKey {
                    key: key.to_string(),
                })?,
        };

        let path = rewrite_path(&path, &self.config.token_rules, tokens);
        let mut candidates = self.document.find(&path);
        debug!(%key, %path, candidates = candidates.len(), "target lookup");

        if let Some(pick) = picks.target {
            return pick_candidate(path, candidates, pick);
        }

        let relevant = relevant_tokens(&self.config.token_rules, tokens, &candidates);
        Ok(match disambiguate(&relevant, &candidates) {
            Disambiguation::Selected(index) => Resolution::Selected {
                path,
                target: candidates.swap_remove(index),
            },
            Disambiguation::Ambiguous {
                exact_matches,
                choices,
            } => Resolution::Ambiguous(Ambiguity {
                stage: AmbiguityStage::Target,
                path,
                candidates,
                exact_matches,
                choices,
            }),
            Disambiguation::NoCandidates => Resolution::NoTarget { path },
        })
    }

    /// The instances of a group in this document.
    pub fn group_instances(&self, group: &HierarchicalGroupConfig) -> Vec<GroupInstance> {
        enumerate_instances(group, self.document)
    }

    /// Choose a group instance, or the resolution to report instead.
    fn choose_instance(
        &self,
        group: &HierarchicalGroupConfig,
        tokens: &TokenMap,
        picks: &Picks,
    ) -> Result<InstanceChoice, InjectError> {
        let mut instances = self.group_instances(group);

        if let Some(pick) = &picks.group {
            return match pick_instance(&instances, pick) {
                Some(instance) => Ok(InstanceChoice::Chosen(instance.clone())),
                None => Err(InjectError::NoSuchInstance {
                    group: group.name.clone(),
                    pick: match pick {
                        GroupPick::Index(index) => index.to_string(),
                        GroupPick::Display(value) => format!("'{value}'"),
                    },
                }),
            };
        }

        let sections: Vec<XmlTargetSection> =
            instances.iter().map(|instance| instance.section.clone()).collect();
        let relevant = relevant_tokens(&self.config.token_rules, tokens, &sections);
        Ok(match disambiguate(&relevant, &sections) {
            Disambiguation::Selected(index) => InstanceChoice::Chosen(instances.swap_remove(index)),
            Disambiguation::Ambiguous {
                exact_matches,
                choices,
            } => InstanceChoice::Report(Resolution::Ambiguous(Ambiguity {
                stage: AmbiguityStage::Group {
                    name: group.name.clone(),
                },
                path: group.group_selector.clone(),
                candidates: sections,
                exact_matches,
                choices,
            })),
            Disambiguation::NoCandidates => InstanceChoice::Report(Resolution::NoTarget {
                path: group.group_selector.clone(),
            }),
        })
    }
}

fn pick_candidate(
    path: StructuralPath,
    mut candidates: Vec<XmlTargetSection>,
    pick: usize,
) -> Result<Resolution, InjectError> {
    if candidates.is_empty() {
        return Ok(Resolution::NoTarget { path });
    }
    if pick >= candidates.len() {
        return Err(InjectError::PickOutOfRange {
            pick,
            candidates: candidates.len(),
        });
    }
    Ok(Resolution::Selected {
        path,
        target: candidates.swap_remove(pick),
    })
}
