use regex::Regex;
use std::sync::LazyLock;

/// Regex seguindo o padrão (?ix)
/// i: case-insensitive
/// x: modo verbose (ignora espaços e permite comentários)
pub static REGEX_PLANILHA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^ # Início da string
        [^/\\]+ # Nome do arquivo, sem diretórios
        \.(?:xlsx|xlsm|xlsb|xls|ods) # Extensões lidas pelo calamine
        $ # Fim da string
        ",
    )
    .unwrap()
});

// Regex para limpeza
pub static RE_NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());
