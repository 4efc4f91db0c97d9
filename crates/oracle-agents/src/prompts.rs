//! Instruction templates for the analyst tasks
//!
//! Each template is a minijinja source string rendered by the context
//! assembler; `{{ query }}` is the ticker, `{{ data.<source> }}` the fetched
//! reference data, and `{{ outputs.<task> }}` upstream task outputs. Deep
//! runs extend each template with additional sections rather than swapping
//! it out wholesale.

use oracle_core::{Depth, Style};

/// Company profile research instructions
pub fn profile_instructions(depth: Depth) -> String {
    let deep_focus = match depth {
        Depth::Deep => {
            "\nAlso analyze industry trends, the regulatory environment, and \
             long-term strategic positioning.\n"
        }
        Depth::Quick => "",
    };
    let deep_fields = match depth {
        Depth::Deep => {
            r#",
    "swot_analysis": {
        "strengths": ["Strength 1", "Strength 2"],
        "weaknesses": ["Weakness 1", "Weakness 2"],
        "opportunities": ["Opportunity 1", "Opportunity 2"],
        "threats": ["Threat 1", "Threat 2"]
    },
    "future_outlook": "Detailed outlook analysis""#
        }
        Depth::Quick => "",
    };
    format!(
        r#"Gather and analyze a comprehensive profile of {{{{ query }}}}.
Research the company's business model, products and services, market
position, competitive advantages, and any notable risks or opportunities.
{deep_focus}
Company profile data:
{{{{ data.profile }}}}

Output in this JSON format:
{{
    "business_outlook": "Positive/Neutral/Negative/Unknown",
    "industry_position": "Leader/Challenger/Niche Player/Unknown",
    "profile_summary": "Concise summary here",
    "business_model": "Detailed analysis here",
    "competitive_analysis": "Competitive positioning details",
    "key_risks": ["Risk 1", "Risk 2"],
    "key_opportunities": ["Opportunity 1", "Opportunity 2"]{deep_fields}
}}"#
    )
}

/// Financial analysis instructions
pub fn financial_instructions(depth: Depth) -> String {
    let deep_focus = match depth {
        Depth::Deep => {
            "\n- Include trend analysis over recent periods\n\
             - Analyze dividend and share repurchase history\n\
             - Evaluate capital allocation strategy\n"
        }
        Depth::Quick => "",
    };
    let deep_metrics = match depth {
        Depth::Deep => {
            r#",
        "dividend_yield": value,
        "free_cash_flow": value,
        "ebitda_margin": value"#
        }
        Depth::Quick => "",
    };
    let deep_fields = match depth {
        Depth::Deep => {
            r#",
    "valuation_analysis": "Details on valuation metrics",
    "capital_allocation_analysis": "Details on how the company allocates capital",
    "trend_analysis": "Analysis of key financial trends over time""#
        }
        Depth::Quick => "",
    };
    format!(
        r#"Perform a comprehensive financial analysis of {{{{ query }}}}.

Analyze:
- Profitability metrics (margins, ROE, ROA)
- Growth rates (revenue, earnings, cash flow)
- Balance sheet health (debt levels, liquidity)
- Valuation metrics (P/E, P/S)
- Cash flow generation and usage
{deep_focus}
Key financial metrics:
{{{{ data.financials }}}}

Current quote:
{{{{ data.quote }}}}

Output in this JSON format:
{{
    "financial_health": "Strong/Moderate/Weak/Unknown",
    "key_metrics": {{
        "pe_ratio": value,
        "revenue_growth": value,
        "profit_margin": value,
        "debt_to_equity": value,
        "return_on_equity": value{deep_metrics}
    }},
    "financial_summary": "Concise summary here",
    "profitability_analysis": "Details on profitability",
    "growth_analysis": "Details on growth trends",
    "balance_sheet_analysis": "Details on balance sheet health"{deep_fields}
}}"#
    )
}

/// News and sentiment analysis instructions
pub fn news_instructions(depth: Depth) -> String {
    let deep_focus = match depth {
        Depth::Deep => {
            "\nAlso analyze analyst opinions and the potential impact of the \
             news on stock price and business performance.\n"
        }
        Depth::Quick => "",
    };
    let deep_fields = match depth {
        Depth::Deep => {
            r#",
    "analyst_consensus": "Details on analyst opinions",
    "potential_stock_impact": "Analysis of potential news impact on stock",
    "sentiment_trend": "How sentiment has changed recently""#
        }
        Depth::Quick => "",
    };
    format!(
        r#"Analyze recent news, market sentiment, and media coverage for {{{{ query }}}}.

Your analysis should include:
- Summary of major recent news events
- Overall sentiment assessment (positive, neutral, negative)
- Key narrative themes in media coverage
- Impact of recent events on company perception
{deep_focus}
Recent news:
{{{{ data.news }}}}

Output in this JSON format:
{{
    "sentiment": "Positive/Neutral/Negative/Unknown",
    "news_summary": "Concise summary here",
    "key_themes": ["Theme 1", "Theme 2"],
    "notable_events": ["Event 1", "Event 2"]{deep_fields}
}}"#
    )
}

/// Synthesis instructions for the investment judge
///
/// The style decides which analyst reports drive the rating.
pub fn judge_instructions(style: Style) -> String {
    let weighting = match style {
        Style::FactsFirst => "Base your rating solely on the Financial Analysis.",
        Style::Balanced => {
            "Base your rating on the Financial Analysis, Company Profile, and \
             News Sentiment, weighed evenly."
        }
        Style::NewsWeighted => "Base your rating primarily on the News Sentiment.",
    };
    format!(
        r#"Provide an investment rating for {{{{ query }}}} based on the reports below.

{weighting}

Financial Analysis:
{{{{ outputs.financial_analysis }}}}

Company Profile:
{{{{ outputs.profile_research }}}}

News Sentiment:
{{{{ outputs.news_analysis }}}}

Based on this information, provide your investment rating as one of:
STRONG BUY, BUY, HOLD, SELL, or STRONG SELL.
Also provide your confidence level (High/Medium/Low) and a concise
justification for your rating.

Output in this JSON format:
{{
    "rating": "your rating (STRONG BUY, BUY, HOLD, SELL, or STRONG SELL)",
    "confidence": "High/Medium/Low",
    "justification": "Your detailed justification here"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_templates_extend_quick_sections() {
        assert!(!profile_instructions(Depth::Quick).contains("swot_analysis"));
        assert!(profile_instructions(Depth::Deep).contains("swot_analysis"));
        assert!(!financial_instructions(Depth::Quick).contains("capital_allocation_analysis"));
        assert!(financial_instructions(Depth::Deep).contains("capital_allocation_analysis"));
        assert!(!news_instructions(Depth::Quick).contains("sentiment_trend"));
        assert!(news_instructions(Depth::Deep).contains("sentiment_trend"));
    }

    #[test]
    fn test_templates_reference_their_data_sources() {
        assert!(profile_instructions(Depth::Quick).contains("{{ data.profile }}"));
        let financial = financial_instructions(Depth::Quick);
        assert!(financial.contains("{{ data.financials }}"));
        assert!(financial.contains("{{ data.quote }}"));
        assert!(news_instructions(Depth::Quick).contains("{{ data.news }}"));
    }

    #[test]
    fn test_judge_weighting_follows_style() {
        assert!(judge_instructions(Style::FactsFirst).contains("solely on the Financial Analysis"));
        assert!(judge_instructions(Style::Balanced).contains("weighed evenly"));
        assert!(judge_instructions(Style::NewsWeighted).contains("primarily on the News Sentiment"));
        for style in [Style::Balanced, Style::FactsFirst, Style::NewsWeighted] {
            let prompt = judge_instructions(style);
            assert!(prompt.contains("{{ outputs.financial_analysis }}"));
            assert!(prompt.contains("{{ outputs.profile_research }}"));
            assert!(prompt.contains("{{ outputs.news_analysis }}"));
            assert!(prompt.contains("STRONG BUY, BUY, HOLD, SELL, or STRONG SELL"));
        }
    }
}
