use deunicode::deunicode;

use crate::Tabela;

/// Coloca o texto em maiúsculas e remove a acentuação.
///
/// A transliteração pode gerar minúsculas (ex.: `№` -> `No`), por isso o
/// resultado ASCII passa de novo para maiúsculas: a função é idempotente.
///
/// ```
/// use converter_remessas_dhl::normalizar_texto;
///
/// assert_eq!(normalizar_texto("São José dos Pinhais"), "SAO JOSE DOS PINHAIS");
/// assert_eq!(normalizar_texto("Florianópolis"), normalizar_texto("FLORIANOPOLIS"));
/// ```
pub fn normalizar_texto(texto: &str) -> String {
    let maiusculas = texto.to_uppercase();

    if maiusculas.is_ascii() {
        return maiusculas;
    }

    deunicode(&maiusculas).to_ascii_uppercase()
}

/// Normaliza todas as células de texto da tabela (valores nulos não mudam).
pub fn normalizar_tabela(tabela: &mut Tabela) {
    tabela.map_celulas(normalizar_texto);
}
