//! The analyst catalog
//!
//! Agent personas and the task graph for a company analysis: three
//! independent analysis tasks fanning into a terminal judge task. Quick
//! runs give each analyst only its own data sources; deep runs give every
//! analyst all of them, with slightly warmer sampling.

use oracle_core::{AgentSpec, Depth, Result, Style, TaskSpec};
use oracle_workflow::Workflow;

use crate::prompts;

/// Well-known task ids
pub mod tasks {
    /// Company profile research task
    pub const PROFILE: &str = "profile_research";
    /// Financial analysis task
    pub const FINANCIAL: &str = "financial_analysis";
    /// News and sentiment analysis task
    pub const NEWS: &str = "news_analysis";
    /// Terminal synthesis task
    pub const JUDGE: &str = "investment_judge";
}

/// Reference-data source names
pub mod sources {
    /// Company profile record
    pub const PROFILE: &str = "profile";
    /// Current stock quote
    pub const QUOTE: &str = "quote";
    /// Aggregated key financials
    pub const FINANCIALS: &str = "financials";
    /// Recent news digest
    pub const NEWS: &str = "news";
}

/// The financial analyst persona
pub fn financial_analyst(depth: Depth) -> AgentSpec {
    AgentSpec::builder("financial")
        .role("Financial Analyst")
        .goal(
            "Provide accurate and insightful financial analysis of target \
             companies. Handle errors and missing data gracefully. Your final \
             output MUST be in the JSON format described in your task.",
        )
        .backstory(
            "You are a veteran Wall Street analyst with 20 years of experience. \
             You've worked at top investment banks and have a reputation for \
             spotting financial trends and red flags before others. You focus on \
             facts and figures, always backing your statements with data. When \
             faced with missing or unreliable data, you clearly indicate the \
             limitations while still providing valuable analysis on what is \
             available. You think in terms of numbers, ratios, and financial \
             metrics.",
        )
        .capability(sources::FINANCIALS)
        .capability(sources::QUOTE)
        .temperature(match depth {
            Depth::Deep => 0.3,
            Depth::Quick => 0.2,
        })
        .build()
}

/// The company profile researcher persona
pub fn profile_researcher(depth: Depth) -> AgentSpec {
    AgentSpec::builder("profile")
        .role("Company Profile Researcher")
        .goal(
            "Research and provide comprehensive company profiles. Handle \
             errors gracefully when information is unavailable. Your final \
             output MUST be in the JSON format described in your task.",
        )
        .backstory(
            "You are a seasoned business researcher with expertise in industry \
             analysis and competitive intelligence. You excel at distilling \
             complex business information into clear, strategic insights. You're \
             known for your thoroughness but also for your ability to work with \
             incomplete information; when you can't find certain data, you \
             acknowledge the gaps and provide the best insights possible with \
             what is available.",
        )
        .capability(sources::PROFILE)
        .temperature(match depth {
            Depth::Deep => 0.5,
            Depth::Quick => 0.3,
        })
        .build()
}

/// The news and sentiment analyst persona
pub fn news_analyst(depth: Depth) -> AgentSpec {
    AgentSpec::builder("news")
        .role("News & Sentiment Analyst")
        .goal(
            "Analyze news and market sentiment for target companies. Handle \
             cases where little or no news is available gracefully. Your final \
             output MUST be in the JSON format described in your task.",
        )
        .backstory(
            "You are a former financial journalist with 15 years of experience \
             covering markets and companies, since specialized in sentiment \
             analysis and media monitoring. You have a knack for reading between \
             the lines, identifying media bias, and spotting emerging narratives \
             before they become mainstream. You can distinguish between \
             substantive news and market noise. For companies with little \
             coverage, you acknowledge the limitations while still providing \
             valuable context on what's available.",
        )
        .capability(sources::NEWS)
        .temperature(match depth {
            Depth::Deep => 0.7,
            Depth::Quick => 0.5,
        })
        .build()
}

/// The investment judge persona
pub fn investment_judge() -> AgentSpec {
    AgentSpec::builder("judge")
        .role("Investment Judge")
        .goal(
            "Provide a well-reasoned investment rating and justification for a \
             company, based on inputs from the other analysts. Output MUST be \
             in JSON format.",
        )
        .backstory(
            "You are an impartial judge with expertise in finance and market \
             analysis. You receive structured reports from other analysts and \
             synthesize them into a final investment rating and justification.",
        )
        .temperature(0.1)
        .build()
}

/// Build the company-analysis workflow for a depth and judge style
///
/// Profile, financial, and news tasks have no prerequisites and run
/// concurrently; the judge depends on all three.
pub fn build_workflow(depth: Depth, style: Style) -> Result<Workflow> {
    let mut profile = TaskSpec::builder(tasks::PROFILE, "profile")
        .instructions(prompts::profile_instructions(depth))
        .reference(sources::PROFILE)
        .expected_output("Comprehensive company profile analysis");
    let mut financial = TaskSpec::builder(tasks::FINANCIAL, "financial")
        .instructions(prompts::financial_instructions(depth))
        .reference(sources::FINANCIALS)
        .reference(sources::QUOTE)
        .expected_output("Detailed financial analysis");
    let mut news = TaskSpec::builder(tasks::NEWS, "news")
        .instructions(prompts::news_instructions(depth))
        .reference(sources::NEWS)
        .expected_output("News and sentiment analysis");

    if depth == Depth::Deep {
        // Deep runs let every analyst consult every data source
        profile = profile
            .reference(sources::QUOTE)
            .reference(sources::FINANCIALS)
            .reference(sources::NEWS);
        financial = financial.reference(sources::PROFILE).reference(sources::NEWS);
        news = news
            .reference(sources::PROFILE)
            .reference(sources::QUOTE)
            .reference(sources::FINANCIALS);
    }

    let judge = TaskSpec::builder(tasks::JUDGE, "judge")
        .instructions(prompts::judge_instructions(style))
        .depends_on(tasks::FINANCIAL)
        .depends_on(tasks::PROFILE)
        .depends_on(tasks::NEWS)
        .expected_output("Investment rating and justification");

    Workflow::builder()
        .add_agent(financial_analyst(depth))
        .add_agent(profile_researcher(depth))
        .add_agent(news_analyst(depth))
        .add_agent(investment_judge())
        .add_task(profile.build())
        .add_task(financial.build())
        .add_task(news.build())
        .add_task(judge.build())
        .build()
}
