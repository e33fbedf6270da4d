use crate::models::GMV_RANGES;

/// Renders the analysis instructions for `domain`, focused on `url`.
///
/// The GMV section walks the model through a fixed reasoning procedure but
/// asks for the chosen label only, never the reasoning.
pub fn build_prompt(domain: &str, url: &str) -> String {
    let ranges = GMV_RANGES
        .iter()
        .map(|r| format!("            -   \"{}\"", r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert business analyst. Your task is to analyze the website associated with the domain: {domain} and provide a structured JSON output as described below.
The specific URL to focus your analysis on is: {url}.

Your response MUST be a valid JSON object adhering to the provided schema.
For each field in the JSON, provide values of the correct type as specified in the schema. String values should NOT include any markdown formatting or unescaped special characters. All strings must be properly JSON escaped.

Please provide the following information in the JSON object:

1.  **url**: Plain string. The exact URL that was analyzed: '{url}'.

2.  **vertical**: Plain string. Identify the primary business vertical. Be concise and impactful, using 2-4 words.

3.  **gmv**: For this field, act as an expert E-commerce Business Intelligence Analyst. Analyze the homepage of the given domain and place its annual Gross Merchandise Value (GMV) into a predefined category.
    Follow these steps meticulously in your internal reasoning:
    1.  **Initial Scan & Business Model Identification:**
        -   Access and parse the content of the provided URL ({url}).
        -   Determine the business model. Classify it as one of: [D2C (Direct-to-Consumer), Marketplace, Subscription, Service-based, Info-product, B2C].
        -   Look for any explicit mentions of financial figures, customer counts, or order volumes.
    2.  **Product & Pricing Analysis:**
        -   Estimate the number of products or SKUs on offer. If not visible, note it internally.
        -   Identify 3-5 representative products. Extract names and prices. Calculate an Average Product Price (APP). Note the currency.
    3.  **Proxy Data Extraction:**
        -   **Social Proof:** Find customer numbers, community size, total items sold.
        -   **Review Data:** Look for total review counts.
        -   **Scale Indicators:** Note physical stores, team size, years in business, press or investors.
    4.  **Synthesis & GMV Range Selection:**
        -   Synthesize everything gathered above.
        -   Select the single most appropriate annual GMV range from the **mandatory list** below.
            **Predefined GMV Ranges:**
{ranges}
    The value of the 'gmv' field MUST BE ONLY the selected range string (e.g., "$1M - $5M"). Do NOT include confidence scores, reasoning, or any other text in it. If GMV is not applicable, use 'N/A'.

4.  **products**: Plain string. Summarize key products/services, typical price points, pricing models, or observed pricing strategy.

5.  **desc**: Plain string. Write a brief (1-3 sentences) description of the website's core business, value proposition, and target audience.

6.  **country**: Plain string. The two-letter ISO 3166-1 alpha-2 country code where the company is primarily based or headquartered (e.g., 'US' for United States, 'GB' for United Kingdom, 'DE' for Germany). If the primary country is unclear, or the company is truly global without a distinct headquarters, use 'XX'.
"#
    )
}
