//! Prompt templates for the answer pipeline.
//!
//! Three fixed templates with named inputs. Substitution only; the values
//! are embedded as-is, with no validation of their content.

/// Rewrite a natural-language question into a keyword-search phrase.
///
/// Four worked examples steer the model toward short, search-friendly
/// output.
pub fn reformulation(query: &str) -> String {
    format!(
        r#"Переформулируй следующий запрос так, чтобы он был максимально подходящим для поиска в интернете. Примеры:
Оригинальный запрос: Какие факультеты есть в Университете ИТМО?
Переформулированный запрос: факультеты в университете итмо

Оригинальный запрос: В каком году был основан Университет ИТМО?
Переформулированный запрос: год основания университета итмо

Оригинальный запрос: В каком городе находится главный кампус Университета ИТМО?
Переформулированный запрос: где находится главный кампус университета итмо

Оригинальный запрос: В каком году Университет ИТМО был включён в число Национальных исследовательских университетов России?
Переформулированный запрос: год включения университета итмо в число национальных исследовательских университетов россии

Оригинальный запрос: {query}
Переформулированный запрос:"#,
        query = query
    )
}

/// Pick an answer option from the question plus retrieved context.
///
/// The model is instructed to answer with only a digit and then explain the
/// choice; the digit is recovered downstream by the extractor.
pub fn answer_selection(question: &str, options: &[String], context: &str) -> String {
    format!(
        r#"На основе следующего контекста выбери правильный вариант ответа на вопрос. Ответ должен содержать только цифру, соответствующую правильному варианту. Объясни, почему выбран именно этот вариант.
Контекст: {context}
Вопрос: {question}
Варианты ответов:
{options}
Ответ (только цифра):"#,
        context = context,
        question = question,
        options = options.join("\n")
    )
}

/// Confirm or correct a candidate answer against one source page's text.
pub fn verification(question: &str, answer: &str, text: &str) -> String {
    format!(
        r#"Проверь, соответствует ли ответ {answer} на вопрос "{question}" информации на странице. Если нет, предложи исправленный ответ и кратко объясни относительно чего ты сделал выводы таков.
Текст страницы: {text}
Исправленный ответ (только цифра):"#,
        answer = answer,
        question = question,
        text = text
    )
}
