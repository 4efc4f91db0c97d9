//! Context assembly
//!
//! Turns a task spec plus the current execution context into the concrete
//! payload handed to the task executor. Pure over the context: resolves
//! prerequisite outputs by id, attaches declared reference data, and
//! renders the instruction template. No side effects.

use minijinja::Environment;
use oracle_core::{AgentSpec, Error, ExecutionContext, Result, TaskSpec};
use std::collections::HashSet;

/// Concrete input for one task execution
#[derive(Debug, Clone)]
pub struct AssembledInput {
    /// Task id this input was assembled for
    pub task: String,
    /// System prompt (agent persona and goal)
    pub system: String,
    /// Rendered instruction prompt
    pub prompt: String,
    /// Temperature override from the agent spec
    pub temperature: Option<f32>,
}

/// Assembles executor inputs from task specs and the execution context
///
/// Templates see run parameters at the top level (`{{ query }}`),
/// prerequisite outputs under `outputs.<task_id>`, and reference data under
/// `data.<source>`.
pub struct ContextAssembler {
    env: Environment<'static>,
}

impl ContextAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Assemble the input for one task
    ///
    /// `waived` names prerequisites whose absence is acceptable (failed
    /// optional tasks); any other missing prerequisite or declared
    /// reference source is a [`Error::MissingDependency`].
    pub fn assemble(
        &self,
        task: &TaskSpec,
        agent: &AgentSpec,
        ctx: &ExecutionContext,
        waived: &HashSet<String>,
    ) -> Result<AssembledInput> {
        for dep in &task.depends_on {
            if !ctx.has_output(dep) && !waived.contains(dep) {
                return Err(Error::missing_dependency(&task.id, dep));
            }
        }
        for source in &task.references {
            if ctx.reference(source).is_none() {
                return Err(Error::missing_dependency(&task.id, source));
            }
        }

        let mut scope = serde_json::Map::new();
        for (key, value) in ctx.params() {
            scope.insert(key.clone(), value.clone());
        }
        scope.insert(
            "outputs".to_string(),
            serde_json::Value::Object(ctx.outputs().clone().into_iter().collect()),
        );
        scope.insert(
            "data".to_string(),
            serde_json::Value::Object(ctx.references().clone().into_iter().collect()),
        );

        let rendered = self
            .env
            .render_str(&task.instructions, minijinja::Value::from_serialize(&scope))
            .map_err(|e| Error::Template {
                task: task.id.clone(),
                message: e.to_string(),
            })?;

        let prompt = if task.expected_output.is_empty() {
            rendered
        } else {
            format!("{rendered}\n\nExpected output: {}", task.expected_output)
        };

        Ok(AssembledInput {
            task: task.id.clone(),
            system: agent.system_prompt(),
            prompt,
            temperature: agent.temperature,
        })
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::TaskSpec;

    fn agent() -> AgentSpec {
        AgentSpec::builder("judge")
            .role("Investment Judge")
            .goal("Synthesize a verdict")
            .backstory("An impartial judge.")
            .temperature(0.1)
            .build()
    }

    #[test]
    fn test_assemble_substitutes_outputs_and_params() {
        let task = TaskSpec::builder("judge", "judge")
            .instructions("Rate {{ query }}. Financials: {{ outputs.financial_analysis }}")
            .depends_on("financial_analysis")
            .build();

        let mut ctx = ExecutionContext::for_query("AAPL");
        ctx.insert_output("financial_analysis", serde_json::json!("F-OK"))
            .unwrap();

        let input = ContextAssembler::new()
            .assemble(&task, &agent(), &ctx, &HashSet::new())
            .unwrap();

        assert!(input.prompt.contains("Rate AAPL"));
        assert!(input.prompt.contains("F-OK"));
        assert_eq!(input.temperature, Some(0.1));
        assert!(input.system.contains("Investment Judge"));
    }

    #[test]
    fn test_missing_prerequisite_is_an_error() {
        let task = TaskSpec::builder("judge", "judge")
            .instructions("{{ outputs.news_analysis }}")
            .depends_on("news_analysis")
            .build();
        let ctx = ExecutionContext::for_query("AAPL");

        let err = ContextAssembler::new()
            .assemble(&task, &agent(), &ctx, &HashSet::new())
            .unwrap_err();
        assert!(
            matches!(err, Error::MissingDependency { dependency, .. } if dependency == "news_analysis")
        );
    }

    #[test]
    fn test_waived_optional_prerequisite_renders_absent() {
        let task = TaskSpec::builder("judge", "judge")
            .instructions("News: {{ outputs.news_analysis | default('unavailable') }}")
            .depends_on("news_analysis")
            .build();
        let ctx = ExecutionContext::for_query("AAPL");

        let waived: HashSet<String> = ["news_analysis".to_string()].into_iter().collect();
        let input = ContextAssembler::new()
            .assemble(&task, &agent(), &ctx, &waived)
            .unwrap();
        assert!(input.prompt.contains("News: unavailable"));
    }

    #[test]
    fn test_missing_reference_source_is_an_error() {
        let task = TaskSpec::builder("profile_research", "judge")
            .instructions("Profile: {{ data.profile }}")
            .reference("profile")
            .build();
        let ctx = ExecutionContext::for_query("AAPL");

        let err = ContextAssembler::new()
            .assemble(&task, &agent(), &ctx, &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingDependency { dependency, .. } if dependency == "profile"));
    }

    #[test]
    fn test_expected_output_is_appended() {
        let task = TaskSpec::builder("t", "judge")
            .instructions("Do the thing for {{ query }}")
            .expected_output("JSON with a rating field")
            .build();
        let ctx = ExecutionContext::for_query("MSFT");

        let input = ContextAssembler::new()
            .assemble(&task, &agent(), &ctx, &HashSet::new())
            .unwrap();
        assert!(input.prompt.ends_with("Expected output: JSON with a rating field"));
    }

    #[test]
    fn test_bad_template_reports_task() {
        let task = TaskSpec::builder("broken", "judge")
            .instructions("{% if %}")
            .build();
        let ctx = ExecutionContext::new();

        let err = ContextAssembler::new()
            .assemble(&task, &agent(), &ctx, &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, Error::Template { task, .. } if task == "broken"));
    }
}
