//! Access rules shared by application configs and custom dashboards.

use serde::{Deserialize, Serialize};

use crate::restapi::{AccessRule, SUPPORTED_ACCESS_TYPES, SUPPORTED_RELATION_TYPES};
use crate::schema::{Attribute, Block, NestedBlock, Validator};
use crate::value::{model_to_wire_string_or_empty, wire_to_model_string, StringValue};

/// One access rule in the model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessRuleModel {
    /// `READ` or `READ_WRITE`.
    pub access_type: StringValue,
    /// Id of the related user, token, role or team.
    pub related_id: StringValue,
    /// Kind of the related entity.
    pub relation_type: StringValue,
}

impl AccessRuleModel {
    /// A rule with the given access and relation type and no related id.
    pub fn new(access_type: &str, relation_type: &str) -> Self {
        Self {
            access_type: StringValue::known(access_type),
            related_id: StringValue::Null,
            relation_type: StringValue::known(relation_type),
        }
    }

    /// Set the related id.
    pub fn with_related_id(mut self, related_id: &str) -> Self {
        self.related_id = StringValue::known(related_id);
        self
    }
}

/// Schema of an access rule list.
pub fn access_rule_block(description: &str) -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_description(description)
            .with_attribute(
                "access_type",
                Attribute::required_string()
                    .with_description("The access type of the given access rule")
                    .with_validator(Validator::one_of(&SUPPORTED_ACCESS_TYPES)),
            )
            .with_attribute(
                "related_id",
                Attribute::optional_string()
                    .with_description(
                        "The id of the related entity (user, api_token, etc.) of the given access rule",
                    )
                    .with_validator(Validator::length_between(0, 64)),
            )
            .with_attribute(
                "relation_type",
                Attribute::required_string()
                    .with_description("The relation type of the given access rule")
                    .with_validator(Validator::one_of(&SUPPORTED_RELATION_TYPES)),
            ),
    )
}

/// Model rules to wire rules. A blank related id is sent as absent.
pub fn access_rules_to_wire(rules: &[AccessRuleModel]) -> Vec<AccessRule> {
    rules
        .iter()
        .map(|rule| AccessRule {
            access_type: model_to_wire_string_or_empty(&rule.access_type),
            related_id: rule
                .related_id
                .as_known()
                .filter(|id| !id.trim().is_empty())
                .cloned(),
            relation_type: model_to_wire_string_or_empty(&rule.relation_type),
        })
        .collect()
}

/// Wire rules to model rules, keeping the server's order.
pub fn access_rules_from_wire(rules: &[AccessRule]) -> Vec<AccessRuleModel> {
    rules
        .iter()
        .map(|rule| AccessRuleModel {
            access_type: wire_to_model_string(Some(&rule.access_type)),
            related_id: wire_to_model_string(rule.related_id.as_deref()),
            relation_type: wire_to_model_string(Some(&rule.relation_type)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_related_id_is_absent() {
        let rules = vec![
            AccessRuleModel::new("READ_WRITE", "GLOBAL"),
            AccessRuleModel::new("READ", "USER").with_related_id("  "),
            AccessRuleModel::new("READ", "TEAM").with_related_id("team-1"),
        ];

        let wire = access_rules_to_wire(&rules);
        assert_eq!(wire[0].related_id, None);
        assert_eq!(wire[1].related_id, None);
        assert_eq!(wire[2].related_id.as_deref(), Some("team-1"));
    }

    #[test]
    fn test_rules_round_trip_in_order() {
        let rules = vec![
            AccessRuleModel::new("READ", "USER").with_related_id("u1"),
            AccessRuleModel::new("READ_WRITE", "GLOBAL"),
        ];

        let back = access_rules_from_wire(&access_rules_to_wire(&rules));
        assert_eq!(back, rules);
    }

    #[test]
    fn test_block_declares_validators() {
        let block = access_rule_block("rules");
        let access_type = &block.block.attributes["access_type"];
        assert!(access_type.flags.required);
        assert_eq!(access_type.validators.len(), 1);
        assert!(block.block.attributes["related_id"].flags.optional);
    }
}
