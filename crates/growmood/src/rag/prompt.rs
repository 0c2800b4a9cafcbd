//! System prompt and user question templates
//!
//! Both are pure functions of their inputs so the prompt contract can be
//! tested without a model in the loop.

/// Result count asked for when the caller does not specify one
pub const DEFAULT_MIN_RESULTS: usize = 10;

const PERSONA: &str = "\
You are a food lover with great knowledge about cuisine and food over the world.
You are skilled at filtering and ordering the food to give a good recommendation based on user mood or heart condition.

You have the knowledge of our food database with several column field. You can focus with the important one, such as:
- id: id of the food
- name: name of the food
- description: description of the food
- category: category of the food
- rating: rating of the food
- rating_count: the number of rating given by user";

const RANKING: &str = "\
User will ask you for food recommendations based on user mood. You need to:
1. Filter the food based on the most recommended food for the specific mood
2. Order the food based on highest rating and highest rating_count";

const EXAMPLE: &str = r#"Example Input:
What is the recommendation of food for a user with a bad mood? His mood is bad because he got a bad score in an exam.

Example Output:
{
    "foods": [
        {
            "id": "0KHujW2DAbFZn2rBFLLG",
            "name": "BACON JAM DEVILED EGGS",
            "description": "Deviled eggs, bacon jam, pickled onions",
            "category": "American (New), Cafes, Breakfast, Lunch",
            "rating": 4.2,
            "rating_count": 50,
            "reasoning": "[[ Reason why this food recommended ]]"
        }
    ]
}"#;

/// Instruction line controlling how many foods the model returns
pub fn count_instruction(result_count: Option<usize>) -> String {
  match result_count {
    Some(count) => format!("Give exactly {count} foods. The User asked for {count} foods."),
    None => format!(
      "Give X number of foods where X is the number that the User asks. If X is not provided, give at least {DEFAULT_MIN_RESULTS} foods."
    ),
  }
}

/// Render the system prompt around the two assembled context blocks
pub fn system_prompt(menu_context: &str, research_context: &str, result_count: Option<usize>) -> String {
  format!(
    "{PERSONA}

REMEMBER, The food database list is structured as <food_0>, <food_1>, etc. Here is the list
{menu_context}
REMEMBER, Your output should come from the above data, don't hallucinate!

{RANKING}

{count}

{EXAMPLE}

You can refer this research for better recommendation
{research_context}

REMEMBER, the output should follow the above structure. Don't include any explanation about the answer!
REMEMBER, please also include the reasoning for each food!",
    count = count_instruction(result_count),
  )
}

/// The user turn sent alongside the system prompt
pub fn user_question(mood: &str, description: &str, result_count: Option<usize>) -> String {
  let top = match result_count {
    Some(count) => format!("top {count}"),
    None => "top".to_string(),
  };
  let description = description.trim();
  if description.is_empty() {
    format!("Please provide the {top} food recommendations for people that feel {}", mood.trim())
  } else {
    format!(
      "Please provide the {top} food recommendations for people that feel {} and {description}",
      mood.trim()
    )
  }
}
