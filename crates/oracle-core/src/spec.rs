//! Static agent and task descriptions
//!
//! `AgentSpec` describes who does the work (role, goal, persona, allowed
//! capabilities); `TaskSpec` describes one unit of work and its position in
//! the dependency graph. Both are immutable after construction and are
//! validated when the orchestrator is built.

use serde::{Deserialize, Serialize};

/// Static description of an agent role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique agent identifier
    pub id: String,
    /// Human-readable role name (e.g. "Financial Analyst")
    pub role: String,
    /// What the agent is trying to achieve
    pub goal: String,
    /// Persona text prepended to every prompt for this agent
    pub backstory: String,
    /// Ordered capability identifiers (tool names the agent may invoke)
    pub capabilities: Vec<String>,
    /// Sampling temperature override for this agent
    pub temperature: Option<f32>,
}

impl AgentSpec {
    /// Create a builder for an agent spec
    pub fn builder(id: impl Into<String>) -> AgentSpecBuilder {
        AgentSpecBuilder::new(id)
    }

    /// System prompt combining persona and goal
    pub fn system_prompt(&self) -> String {
        format!("You are {}, a {}.\n\n{}\n\nGoal: {}", self.id, self.role, self.backstory, self.goal)
    }
}

/// Builder for [`AgentSpec`]
#[derive(Debug, Default)]
pub struct AgentSpecBuilder {
    id: String,
    role: String,
    goal: String,
    backstory: String,
    capabilities: Vec<String>,
    temperature: Option<f32>,
}

impl AgentSpecBuilder {
    /// Create a new builder
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the role name
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the goal text
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Set the persona text
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Add a capability identifier
    pub fn capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.push(name.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the spec
    pub fn build(self) -> AgentSpec {
        AgentSpec {
            id: self.id,
            role: self.role,
            goal: self.goal,
            backstory: self.backstory,
            capabilities: self.capabilities,
            temperature: self.temperature,
        }
    }
}

/// Static description of one task in a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Unique task identifier; also the key its output is recorded under
    pub id: String,
    /// Id of the agent that executes this task
    pub agent: String,
    /// Instruction template (minijinja); prerequisite outputs are available
    /// as `outputs.<task_id>` and reference data as `data.<source>`
    pub instructions: String,
    /// Ids of tasks whose outputs this task consumes
    pub depends_on: Vec<String>,
    /// Names of reference-data sources this task declares it needs
    pub references: Vec<String>,
    /// Free-text description of the expected output shape
    pub expected_output: String,
    /// An optional task may fail without failing its dependents or the run
    pub optional: bool,
}

impl TaskSpec {
    /// Create a builder for a task spec
    pub fn builder(id: impl Into<String>, agent: impl Into<String>) -> TaskSpecBuilder {
        TaskSpecBuilder::new(id, agent)
    }
}

/// Builder for [`TaskSpec`]
#[derive(Debug, Default)]
pub struct TaskSpecBuilder {
    id: String,
    agent: String,
    instructions: String,
    depends_on: Vec<String>,
    references: Vec<String>,
    expected_output: String,
    optional: bool,
}

impl TaskSpecBuilder {
    /// Create a new builder
    pub fn new(id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent: agent.into(),
            ..Default::default()
        }
    }

    /// Set the instruction template
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Add a prerequisite task id
    pub fn depends_on(mut self, task_id: impl Into<String>) -> Self {
        self.depends_on.push(task_id.into());
        self
    }

    /// Declare a reference-data source this task needs
    pub fn reference(mut self, source: impl Into<String>) -> Self {
        self.references.push(source.into());
        self
    }

    /// Set the expected-output descriptor
    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = expected.into();
        self
    }

    /// Mark the task as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Build the spec
    pub fn build(self) -> TaskSpec {
        TaskSpec {
            id: self.id,
            agent: self.agent,
            instructions: self.instructions,
            depends_on: self.depends_on,
            references: self.references,
            expected_output: self.expected_output,
            optional: self.optional,
        }
    }
}
