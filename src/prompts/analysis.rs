const PERSONA: &str = "Você é o Jarvis. Personalidade: 50% Lógico (Spock), 50% Coach Proativo.";
const OBJECTIVE: &str =
    "Objetivo: Mitigar TDAH via estimativa de tempo (+20% buffer) e quebra de tarefas.";
const OUTPUT_RULE: &str = "Regra de Saída: Responda com texto limpo, sem markdown excessivo.";

/// The fixed persona instruction sent as the system prompt.
pub fn build_system_prompt() -> String {
    [PERSONA, OBJECTIVE, OUTPUT_RULE].join("\n")
}

/// The single user message asking for an analysis of one task.
pub fn build_user_message(title: &str, description: &str) -> String {
    format!("Analise esta tarefa: '{title}'.\nContexto: {description}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_has_persona_objective_and_rule() {
        let prompt = build_system_prompt();
        assert!(prompt.starts_with("Você é o Jarvis."));
        assert!(prompt.contains("+20% buffer"));
        assert!(prompt.contains("sem markdown"));
        assert_eq!(prompt.lines().count(), 3);
    }

    #[test]
    fn system_prompt_is_stable() {
        assert_eq!(build_system_prompt(), build_system_prompt());
    }

    #[test]
    fn user_message_interpolates_title_and_description() {
        assert_eq!(
            build_user_message("Plan launch", "Draft outline"),
            "Analise esta tarefa: 'Plan launch'.\nContexto: Draft outline"
        );
    }

    #[test]
    fn user_message_with_empty_description() {
        assert!(build_user_message("X", "").ends_with("Contexto: "));
    }
}
