// Fixed display-language replies for the example-matching branch.
// These never go through translation.

pub const EXAMPLE_FOUND_REPLY: &str =
    "🔍 За вашим запитом я знайшов приклад резюме. Ознайомтеся з ним нижче.";

pub const EXAMPLE_NOT_FOUND_REPLY: &str = "🔍 За вашим запитом я не знайшов відповідних резюме. \
    Будь ласка, уточніть спеціалізацію або сформулюйте запит трохи інакше. \
    А ще я можу згенерувати резюме, якщо ви залишите свої дані 👇";
