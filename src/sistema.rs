use std::process::Command;

use crate::RemessaResult;

/// Limpar a tela.
pub fn clear_screen(clear_screen: bool) -> RemessaResult<()> {
    if clear_screen {
        if cfg!(target_os = "windows") {
            // No Windows, 'cls' é um comando interno do 'cmd'.
            Command::new("cmd").args(["/c", "cls"]).status()?;
        } else {
            Command::new("clear").status()?;
        }
    }

    Ok(())
}

/// Exibe a descrição, autoria e versão do programa.
pub fn imprimir_versao_do_programa() {
    let descr = [
        "Este programa converte a planilha de remessas da DHL (abas 'Shipment' e 'Piece')",
        "no layout padronizado de Documentos Fiscais (CSV separado por ';').",
        "Cada remessa recebe o código IBGE do município do destinatário.",
        "Remessas sem código IBGE são gravadas no arquivo 'erro_<nome>.csv'.",
        "Os dois arquivos CSV são compactados em '<nome>.zip'.",
    ];

    for line in &descr {
        println!(" {}", line);
    }

    println!("\n versão: {}\n", env!("CARGO_PKG_VERSION"));
}

/// Formata inteiros com ponto como separador de milhares.
///
/// ```
/// use converter_remessas_dhl::fmt_milhares;
///
/// assert_eq!(fmt_milhares(999), "999");
/// assert_eq!(fmt_milhares(1234567), "1.234.567");
/// ```
pub fn fmt_milhares(n: usize) -> String {
    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    s.chars().enumerate().for_each(|(i, c)| {
        // Ponto quando a distância até o fim for múltipla de 3
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push('.');
        }
        result.push(c);
    });

    result
}
