// [apps/event-log/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: EVENT LOG SOVEREIGN KERNEL (V9.0 - FABRIC IGNITION)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan todos los servicios:
 * despachadores por categoría, segador de zombies, guardia de
 * evicción, espejo del registro y el transporte HTTP.
 * =================================================================
 */

use crate::routes::create_sovereign_router;
use crate::services::producers::{
    AwaitingGenerationProducer, CategoryProducer, CleanUpProducer, MigrationRequestProducer,
    ProjectSyncProducer, TriplesGeneratedProducer,
};
use crate::services::{
    DispatchOrchestrator, RegistryRefreshDaemon, SubscriberEvictionGuard, ZombieReaperService,
};
use crate::state::AppState;
use graphline_infra_db::{StoreClient, StoreError};
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info, instrument};

pub struct EventLogKernel {
    pub server_network_port: u16,
    pub application_shared_state: AppState,
}

impl EventLogKernel {
    /**
     * Ignición del cliente del Ledger y del estado neural.
     * El esquema cristaliza antes de levantar cualquier servicio.
     */
    #[instrument(skip(database_access_token))]
    pub async fn ignite(
        database_connection_url: &str,
        database_access_token: Option<String>,
        listening_port: u16,
    ) -> Result<Self, StoreError> {
        let store_client =
            StoreClient::connect(database_connection_url, database_access_token).await?;

        let application_shared_state = AppState::ignite(store_client).await?;

        Ok(Self {
            server_network_port: listening_port,
            application_shared_state,
        })
    }

    /**
     * Lanza todas las operaciones autónomas del fabric y el servidor
     * HTTP principal. Termina con código 0 ante SIGTERM.
     */
    pub async fn launch_sovereign_operations(self) {
        let shared_application_state = self.application_shared_state.clone();

        // --- 1. DESPACHADORES POR CATEGORÍA ---
        let category_producers = vec![
            CategoryProducer::AwaitingGeneration(AwaitingGenerationProducer::new(
                shared_application_state.clone(),
            )),
            CategoryProducer::TriplesGenerated(TriplesGeneratedProducer::new(
                shared_application_state.clone(),
            )),
            CategoryProducer::ProjectSync(ProjectSyncProducer::commit_sync(
                shared_application_state.clone(),
            )),
            CategoryProducer::ProjectSync(ProjectSyncProducer::global_commit_sync(
                shared_application_state.clone(),
            )),
            CategoryProducer::ProjectSync(ProjectSyncProducer::member_sync(
                shared_application_state.clone(),
            )),
            CategoryProducer::CleanUp(CleanUpProducer::new(shared_application_state.clone())),
            CategoryProducer::MigrationRequest(MigrationRequestProducer::new(
                shared_application_state.clone(),
            )),
        ];

        for category_producer in category_producers {
            let dispatcher = DispatchOrchestrator::new(
                shared_application_state.clone(),
                category_producer,
            );
            tokio::spawn(async move { dispatcher.spawn_dispatch_daemon().await });
        }

        // --- 2. SEGADOR DE ZOMBIES (AUDITORÍA DE CUSTODIA) ---
        let reaper = ZombieReaperService::new(shared_application_state.clone());
        tokio::spawn(async move { reaper.spawn_reaper_daemon().await });

        // --- 3. GUARDIA DE EVICCIÓN (RENOVACIONES) ---
        let eviction_guard = SubscriberEvictionGuard::new(shared_application_state.clone());
        tokio::spawn(async move { eviction_guard.spawn_guard_daemon().await });

        // --- 4. ESPEJO DEL REGISTRO (LEDGER -> RAM) ---
        let registry_refresher = RegistryRefreshDaemon::new(shared_application_state.clone());
        tokio::spawn(async move { registry_refresher.spawn_refresh_daemon().await });

        // --- 5. IGNICIÓN DEL TRANSPORTE HTTP (AXUM) ---
        let sovereign_router = create_sovereign_router(shared_application_state);

        let bind_address = SocketAddr::new(
            "0.0.0.0".parse::<IpAddr>().expect("static address is valid"),
            self.server_network_port,
        );

        info!("🚀 [KERNEL_ONLINE]: Event Log fabric listening at {}", bind_address);

        let tcp_listener = match tokio::net::TcpListener::bind(bind_address).await {
            Ok(tcp_listener) => tcp_listener,
            Err(bind_fault) => {
                error!("💀 [KERNEL_COLLAPSE]: Failed to bind network port: {}", bind_fault);
                std::process::exit(1);
            }
        };

        let serve_result = axum::serve(tcp_listener, sovereign_router)
            .with_graceful_shutdown(Self::await_termination_signal())
            .await;

        match serve_result {
            Ok(()) => {
                info!("🛬 [KERNEL_OFFLINE]: Graceful shutdown complete.");
                std::process::exit(0);
            }
            Err(server_error) => {
                error!("💀 [KERNEL_COLLAPSE]: Runtime failure: {}", server_error);
                std::process::exit(1);
            }
        }
    }

    /// Espera SIGTERM (orquestador de despliegue) o Ctrl-C (operador).
    async fn await_termination_signal() {
        let mut sigterm_stream =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("FATAL: SIGTERM handler installation failed.");

        tokio::select! {
            _ = sigterm_stream.recv() => {
                info!("🛑 [KERNEL]: SIGTERM received. Draining...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 [KERNEL]: Ctrl-C received. Draining...");
            }
        }
    }
}
