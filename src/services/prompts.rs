//! Prompt assembly for every narrative request kind. The templates are the
//! Spanish instruction texts the front-end was tuned against, so they are
//! carried verbatim.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::models::ConversationTurn;
use crate::services::classifier::NumericSummary;

const CONTEXT_SAMPLE_LIMIT: usize = 20;
const ANALYSIS_SAMPLE_LIMIT: usize = 15;
const LEGEND_SAMPLE_LIMIT: usize = 10;
const FREQUENCY_TOP: usize = 5;
const HISTORY_WINDOW: usize = 10;
const MISSING_STAT: &str = "N/A";

pub fn numeric_context(summary: &NumericSummary, integral: bool) -> String {
    let tipo = if integral { "enteros" } else { "decimales" };
    format!(
        r#"Genera un contexto narrativo realista de 2-3 oraciones para estos datos estadísticos:
- Rango: {min} a {max}
- Cantidad: {count} valores
- Tipo: {tipo}

Crea un escenario empresarial, educativo o de investigación en Riohacha/La Guajira que explique QUÉ se está midiendo y POR QUÉ.

Ejemplo del estilo deseado:
"Una empresa de logística en Riohacha está auditando los tiempos de entrega de sus motorizados para optimizar las rutas. Se tomó una muestra aleatoria de los pedidos entregados durante la última hora pico."

Genera un contexto similar apropiado para estos datos. NO uses puntos suspensivos."#,
        min = format_number(summary.min),
        max = format_number(summary.max),
        count = summary.count,
        tipo = tipo,
    )
}

pub fn categorical_context(datos: &[Value]) -> String {
    format!(
        r#"Genera un contexto narrativo realista de 2-3 oraciones para estos datos cualitativos: {datos_str}

Crea un escenario empresarial, educativo o de investigación en Riohacha/La Guajira que explique QUÉ se está midiendo y POR QUÉ.

Ejemplo: "El departamento de recursos humanos de la Universidad de La Guajira realizó una encuesta de satisfacción laboral entre sus docentes. Los datos recopilados ayudarán a identificar áreas de mejora en el ambiente de trabajo."

Genera un contexto similar apropiado para estos datos cualitativos."#,
        datos_str = joined_sample(datos, CONTEXT_SAMPLE_LIMIT),
    )
}

pub fn analysis(datos: &[Value], stats: &Map<String, Value>, context: &str) -> String {
    format!(
        r#"Contexto: {context}

Datos completos: {datos_str}
Frecuencias: {freq_info}

Estadísticas calculadas:
- Media: {media}
- Mediana: {mediana}
- Moda: {moda}
- Rango: {rango}
- Desviación estándar: {desviacion}

Genera una conclusión narrativa detallada de 3-5 oraciones al estilo de este ejemplo:

"Los resultados mostraron que la gran mayoría, un total de seis entregas, se realizaron en exactamente 15 minutos. Hubo un grupo rápido de cuatro pedidos que llegaron en apenas 10 minutos. Sin embargo, debido al tráfico en el centro, tres entregas tardaron 25 minutos y dos pedidos más lejanos demoraron 30 minutos. Finalmente, hubo un único caso excepcional de una entrega express que tardó solo 5 minutos."

Analiza los datos reales y genera una conclusión similar que:
1. Mencione las frecuencias más importantes
2. Explique patrones observados
3. Destaque valores extremos o inusuales
4. Use lenguaje narrativo y profesional

NO repitas las estadísticas básicas, enfócate en contar la historia de los datos."#,
        context = context,
        datos_str = joined_sample(datos, ANALYSIS_SAMPLE_LIMIT),
        freq_info = frequency_summary(datos),
        media = stat_display(stats, "media"),
        mediana = stat_display(stats, "mediana"),
        moda = stat_display(stats, "moda"),
        rango = stat_display(stats, "rango"),
        desviacion = stat_display(stats, "desviacion"),
    )
}

pub fn chat_system(analysis_context: Option<&str>) -> String {
    let mut system = String::from(
        r#"Eres un asistente de estadística amigable y útil. Ayudas a los usuarios a entender:
1. Cómo usar la aplicación de análisis estadístico
2. Qué significan las diferentes estadísticas (media, mediana, moda, etc.)
3. Cómo interpretar los gráficos

Responde de forma clara, concisa y amigable. Usa un lenguaje sencillo sin tecnicismos innecesarios."#,
    );

    if let Some(context) = analysis_context.filter(|c| !c.is_empty()) {
        system.push_str("\n\nDatos del análisis actual:\n");
        system.push_str(context);
    }

    system
}

pub fn chat_prompt(history: &[ConversationTurn], message: &str) -> String {
    let window = history.len().saturating_sub(HISTORY_WINDOW);
    let transcript = history[window..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Historial de conversación:\n{transcript}\n\nUsuario: {message}\n\nAsistente:")
}

/// Builds the legacy chart-legend prompt, or `None` for an unrecognized
/// chart type.
pub fn legend(
    chart_type: &str,
    datos: &[Value],
    stats: &Map<String, Value>,
    context: &str,
) -> Option<String> {
    let datos_str = joined_sample(datos, LEGEND_SAMPLE_LIMIT);
    let context_info = if context.is_empty() {
        String::new()
    } else {
        format!("\n\nContexto del análisis: {context}")
    };

    let prompt = match chart_type {
        "histogram" => format!(
            r#"Datos: {datos_str}
Estadísticas: Media={media}, Mediana={mediana}{context_info}

Genera una leyenda breve (1-2 oraciones) para un HISTOGRAMA que explique qué muestra la distribución de frecuencias. Sé específico sobre lo que representa cada barra.

Ejemplo: "Cada barra representa la cantidad de valores que aparecen con esa frecuencia. La altura indica cuántas veces se repite cada valor en el conjunto de datos."

Genera una leyenda similar y clara."#,
            media = stat_display(stats, "media"),
            mediana = stat_display(stats, "mediana"),
        ),
        "pie" => format!(
            r#"Datos: {datos_str}{context_info}

Genera una leyenda breve (1-2 oraciones) para un GRÁFICO CIRCULAR que explique qué representan las proporciones y los segmentos.

Ejemplo: "Cada segmento muestra el porcentaje que representa cada valor del total. Los colores diferentes facilitan comparar las proporciones visualmentevisuales."

Genera una leyenda similar y clara."#,
        ),
        "boxplot" => format!(
            r#"Estadísticas: Mediana={mediana}, Q1={q1}, Q3={q3}{context_info}

Genera una leyenda breve (1-2 oraciones) para un DIAGRAMA DE CAJA que explique qué muestran la caja, la línea central y los bigotes.

Ejemplo: "La caja muestra el rango donde se concentra el 50% central de los datos. La línea dentro de la caja indica la mediana, y los bigotes muestran los valores mínimos y máximos."

Genera una leyenda similar y clara."#,
            mediana = stat_display(stats, "mediana"),
            q1 = stat_display(stats, "q1"),
            q3 = stat_display(stats, "q3"),
        ),
        _ => return None,
    };

    Some(prompt)
}

/// Renders a value the way it should read inside a prompt: strings bare,
/// everything else as its JSON text.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn joined_sample(datos: &[Value], limit: usize) -> String {
    let mut sample = datos
        .iter()
        .take(limit)
        .map(display_value)
        .collect::<Vec<_>>()
        .join(", ");
    if datos.len() > limit {
        sample.push_str("...");
    }
    sample
}

fn stat_display(stats: &Map<String, Value>, key: &str) -> String {
    stats
        .get(key)
        .map(display_value)
        .unwrap_or_else(|| MISSING_STAT.to_string())
}

fn frequency_summary(datos: &[Value]) -> String {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in datos {
        *counts.entry(display_value(value)).or_insert(0) += 1;
    }

    // Stable sort keeps first-seen order for equal counts.
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    entries
        .into_iter()
        .take(FREQUENCY_TOP)
        .map(|(value, count)| {
            let word = if count == 1 { "vez" } else { "veces" };
            format!("{value} aparece {count} {word}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn turns(raw: &[(&str, &str)]) -> Vec<ConversationTurn> {
        raw.iter()
            .map(|(role, content)| ConversationTurn {
                role: role.to_string(),
                content: content.to_string(),
            })
            .collect()
    }

    fn stats(raw: serde_json::Value) -> Map<String, Value> {
        raw.as_object().cloned().unwrap()
    }

    #[test]
    fn numeric_context_renders_range_count_and_kind() {
        let summary = NumericSummary {
            min: 10.0,
            max: 20.0,
            count: 6,
        };
        let prompt = numeric_context(&summary, true);
        assert!(prompt.contains("- Rango: 10.0 a 20.0"));
        assert!(prompt.contains("- Cantidad: 6 valores"));
        assert!(prompt.contains("- Tipo: enteros"));

        let prompt = numeric_context(
            &NumericSummary {
                min: 1.5,
                max: 9.25,
                count: 2,
            },
            false,
        );
        assert!(prompt.contains("- Rango: 1.5 a 9.25"));
        assert!(prompt.contains("- Tipo: decimales"));
    }

    #[test]
    fn categorical_context_lists_up_to_twenty_values() {
        let datos: Vec<Value> = (0..25).map(|i| json!(format!("v{i}"))).collect();
        let prompt = categorical_context(&datos);
        assert!(prompt.contains("datos cualitativos: v0, v1"));
        assert!(prompt.contains("v19..."));
        assert!(!prompt.contains("v20"));
    }

    #[test]
    fn short_list_has_no_truncation_marker() {
        let datos = vec![json!("rojo"), json!("azul")];
        let prompt = categorical_context(&datos);
        assert!(prompt.contains("datos cualitativos: rojo, azul\n"));
        assert!(!prompt.contains("azul..."));
    }

    #[test]
    fn analysis_caps_sample_at_fifteen() {
        let datos: Vec<Value> = (0..16).map(|i| json!(i)).collect();
        let prompt = analysis(&datos, &Map::new(), "");
        assert!(prompt.contains("Datos completos: 0, 1"));
        assert!(prompt.contains("14..."));
        assert!(!prompt.contains("Datos completos: 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15"));
    }

    #[test]
    fn analysis_substitutes_missing_stats() {
        let datos = vec![json!(15), json!(15), json!(15), json!(10)];
        let stats = stats(json!({ "media": 13.75, "moda": [15] }));
        let prompt = analysis(&datos, &stats, "Entregas de la última hora");

        assert!(prompt.contains("Contexto: Entregas de la última hora"));
        assert!(prompt.contains("- Media: 13.75"));
        assert!(prompt.contains("- Moda: [15]"));
        assert!(prompt.contains("- Mediana: N/A"));
        assert!(prompt.contains("- Desviación estándar: N/A"));
    }

    #[test]
    fn frequency_summary_counts_and_pluralizes() {
        let datos = vec![json!(15), json!(10), json!(15), json!(15), json!(10), json!(5)];
        let prompt = analysis(&datos, &Map::new(), "");
        assert!(prompt.contains(
            "Frecuencias: 15 aparece 3 veces, 10 aparece 2 veces, 5 aparece 1 vez"
        ));
    }

    #[test]
    fn frequency_ties_keep_first_seen_order() {
        let datos = vec![json!("b"), json!("a"), json!("b"), json!("a")];
        let prompt = analysis(&datos, &Map::new(), "");
        assert!(prompt.contains("Frecuencias: b aparece 2 veces, a aparece 2 veces"));
    }

    #[test]
    fn frequency_summary_keeps_top_five() {
        let datos: Vec<Value> = (0..7).map(|i| json!(i)).collect();
        let prompt = analysis(&datos, &Map::new(), "");
        assert!(prompt.contains("Frecuencias: 0 aparece 1 vez"));
        assert!(prompt.contains("4 aparece 1 vez\n"));
        assert!(!prompt.contains("5 aparece"));
    }

    #[test]
    fn chat_system_appends_analysis_context_when_present() {
        let bare = chat_system(None);
        assert!(bare.starts_with("Eres un asistente de estadística"));
        assert!(!bare.contains("Datos del análisis actual"));
        assert_eq!(chat_system(Some("")), bare);

        let with_context = chat_system(Some("Media: 15.4"));
        assert!(with_context.ends_with("Datos del análisis actual:\nMedia: 15.4"));
    }

    #[test]
    fn chat_prompt_keeps_last_ten_turns() {
        let history: Vec<(String, String)> = (1..=12)
            .map(|i| ("user".to_string(), format!("m{i}")))
            .collect();
        let history: Vec<ConversationTurn> = history
            .iter()
            .map(|(role, content)| ConversationTurn {
                role: role.clone(),
                content: content.clone(),
            })
            .collect();

        let prompt = chat_prompt(&history, "¿y la moda?");
        assert!(!prompt.contains("m1\n"));
        assert!(!prompt.contains("m2\n"));
        assert!(prompt.contains("user: m3"));
        assert!(prompt.contains("user: m12"));
        assert!(prompt.ends_with("Usuario: ¿y la moda?\n\nAsistente:"));
    }

    #[test]
    fn chat_prompt_with_empty_history() {
        let prompt = chat_prompt(&[], "hola");
        assert!(prompt.starts_with("Historial de conversación:\n\n"));
        assert!(prompt.contains("Usuario: hola"));
    }

    #[test]
    fn chat_prompt_renders_roles_verbatim() {
        let history = turns(&[("user", "hola"), ("assistant", "¿en qué ayudo?")]);
        let prompt = chat_prompt(&history, "la media");
        assert!(prompt.contains("user: hola\nassistant: ¿en qué ayudo?"));
    }

    #[test]
    fn legend_histogram_includes_stats_and_context() {
        let stats = stats(json!({ "media": 15.4, "mediana": 15 }));
        let prompt = legend("histogram", &[json!(1), json!(2)], &stats, "Entregas").unwrap();
        assert!(prompt.starts_with("Datos: 1, 2\nEstadísticas: Media=15.4, Mediana=15"));
        assert!(prompt.contains("\n\nContexto del análisis: Entregas"));
        assert!(prompt.contains("HISTOGRAMA"));
    }

    #[test]
    fn legend_omits_context_line_when_empty() {
        let prompt = legend("pie", &[json!("a")], &Map::new(), "").unwrap();
        assert!(!prompt.contains("Contexto del análisis"));
        assert!(prompt.contains("GRÁFICO CIRCULAR"));
    }

    #[test]
    fn legend_boxplot_reads_quartile_keys() {
        let stats = stats(json!({ "mediana": 15, "q1": 10, "q3": 20 }));
        let prompt = legend("boxplot", &[], &stats, "").unwrap();
        assert!(prompt.starts_with("Estadísticas: Mediana=15, Q1=10, Q3=20"));
        assert!(prompt.contains("DIAGRAMA DE CAJA"));
    }

    #[test]
    fn legend_caps_sample_at_ten() {
        let datos: Vec<Value> = (0..11).map(|i| json!(i)).collect();
        let prompt = legend("pie", &datos, &Map::new(), "").unwrap();
        assert!(prompt.contains("Datos: 0, 1, 2, 3, 4, 5, 6, 7, 8, 9..."));
    }

    #[test]
    fn legend_rejects_unknown_chart_type() {
        assert!(legend("scatter", &[], &Map::new(), "").is_none());
        assert!(legend("", &[], &Map::new(), "").is_none());
        assert!(legend("Histogram", &[], &Map::new(), "").is_none());
    }

    #[test]
    fn numbers_render_like_json() {
        assert_eq!(display_value(&json!(15)), "15");
        assert_eq!(display_value(&json!(15.0)), "15.0");
        assert_eq!(display_value(&json!(15.5)), "15.5");
        assert_eq!(display_value(&json!("texto")), "texto");
    }
}
