use execution_time::ExecutionTime;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use converter_remessas_dhl::{
    Artefato, Config, RemessaResult, clear_screen, converter_remessas_em, get_config,
    imprimir_versao_do_programa,
};

fn main() {
    let config = match get_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("\n[ERRO CRÍTICO]: {err}");
            process::exit(1);
        }
    };

    iniciar_log(config.verbose);

    if let Err(err) = run(&config) {
        if err.eh_entrada_invalida() {
            warn!("{err}");
            process::exit(2);
        }
        error!("Erro durante a execução: {err}");
        process::exit(1);
    }
}

/// RUST_LOG tem prioridade; sem ele, 'info' (ou 'debug' com --verbose).
fn iniciar_log(verbose: bool) {
    let nivel = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(nivel)),
        )
        .with_target(false)
        .init();
}

fn run(config: &Config) -> RemessaResult<()> {
    let timer = ExecutionTime::start();

    clear_screen(config.clear)?;
    imprimir_versao_do_programa();

    if config.verbose {
        println!("{:#?}\n", config);
    }

    let saida = converter_remessas_em(&config.filial, &config.arquivo, &config.caminhos)?;

    match &saida.artefato {
        Artefato::Zip(zip) => info!(
            "Concluído: {} documento(s) e {} erro(s) em {:?}",
            saida.com_ibge, saida.sem_ibge, zip
        ),
        Artefato::ZipComSobras { zip, sobras } => warn!(
            "Concluído em {:?}, mas não foi possível remover {:?}",
            zip, sobras
        ),
        Artefato::CsvSoltos { csv, erro_csv, erro } => warn!(
            "Concluído sem compactação ({erro}): {:?} e {:?} mantidos",
            csv, erro_csv
        ),
    }

    timer.print_elapsed_time();

    Ok(())
}
