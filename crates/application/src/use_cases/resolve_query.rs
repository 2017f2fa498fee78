use crate::ports::{RecordSource, RecordStore, UpstreamExchange, WritebackFilter};
use crate::task_queue::TaskQueue;
use burrow_dns_domain::{
    root_fallback_name, DomainError, DomainName, Message, Question, RData, Rcode, RecordClass,
    RecordType, ResourceRecord, ServerRole,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, warn};

/// A referral chain longer than this is treated as a dead end.
const MAX_REFERRAL_HOPS: usize = 16;

/// Upper bound on resolver passes per request. Each pass either pops the
/// head task or makes it answerable from the cache, so this is never hit
/// unless the store breaks that contract.
const MAX_RESOLVE_PASSES: usize = 128;

/// The per-request resolution engine. Seeds a task queue from the question
/// section and drains it: every pass answers the head task locally, refers
/// it, or chases referrals over UDP until the cache can answer it.
pub struct ResolveQueryUseCase {
    role: ServerRole,
    store: Arc<dyn RecordStore>,
    upstream: Arc<dyn UpstreamExchange>,
}

impl ResolveQueryUseCase {
    pub fn new(
        role: ServerRole,
        store: Arc<dyn RecordStore>,
        upstream: Arc<dyn UpstreamExchange>,
    ) -> Self {
        Self {
            role,
            store,
            upstream,
        }
    }

    pub async fn execute(&self, request: &Message) -> Result<Message, DomainError> {
        let mut reply =
            Message::reply_to(request, self.role.claims_authority(), self.role.is_recursive());
        let mut queue = TaskQueue::seed(&request.questions);

        let mut passes = 0;
        while let Some(task) = queue.head().cloned() {
            passes += 1;
            if passes > MAX_RESOLVE_PASSES {
                warn!(task = %task.name, "resolver not converging, abandoning task");
                reply.flags.rcode = Rcode::ServerFailure;
                queue.pop();
                continue;
            }
            match self.role {
                ServerRole::Authoritative => {
                    self.resolve_authoritative(&mut reply, &mut queue, &task)
                        .await?
                }
                ServerRole::Local | ServerRole::RecursiveAuthoritative => {
                    self.resolve_recursive(&mut reply, &mut queue, &task)
                        .await?
                }
            }
        }

        reply.finalize_rcode();
        Ok(reply)
    }

    /// Role 1: answer from local data or hand out the closest enclosing
    /// delegation as a referral.
    async fn resolve_authoritative(
        &self,
        reply: &mut Message,
        queue: &mut TaskQueue,
        task: &Question,
    ) -> Result<(), DomainError> {
        if !task.qtype.is_resolvable() {
            warn!(qtype = %task.qtype, "cannot answer question type");
            reply.flags.rcode = Rcode::NotImplemented;
            queue.pop();
            return Ok(());
        }

        if let Some(rr) = self.lookup_local(task).await? {
            queue.pop();
            self.attach_answer(reply, rr).await?;
            return Ok(());
        }

        match self
            .store
            .lookup(RecordSource::Authority, &task.name, RecordType::A, task.qclass)
            .await?
            .any_match()
        {
            Some(rr) => {
                debug!(task = %task.name, referral = %rr.name, "referring");
                queue.pop();
                reply.attach_authority(rr);
            }
            None => {
                debug!(task = %task.name, "no data and no delegation");
                queue.pop();
            }
        }
        Ok(())
    }

    /// Roles 0 and 2: answer from local data, or iterate on the client's
    /// behalf and let the next pass serve the now-cached answer.
    async fn resolve_recursive(
        &self,
        reply: &mut Message,
        queue: &mut TaskQueue,
        task: &Question,
    ) -> Result<(), DomainError> {
        if !task.qtype.is_resolvable() {
            warn!(qtype = %task.qtype, "cannot answer question type");
            reply.flags.rcode = Rcode::NotImplemented;
            queue.pop();
            return Ok(());
        }

        if let Some(rr) = self.lookup_local(task).await? {
            queue.pop();
            self.attach_answer(reply, rr).await?;
            return Ok(());
        }

        self.chase_referrals(reply, queue, task).await
    }

    /// Exact match for the task in the zone file, then the cache file.
    async fn lookup_local(&self, task: &Question) -> Result<Option<ResourceRecord>, DomainError> {
        let zone = self
            .store
            .lookup(RecordSource::Zone, &task.name, task.qtype, task.qclass)
            .await?;
        if let Some(rr) = zone.exact() {
            return Ok(Some(rr));
        }
        Ok(self
            .store
            .lookup(RecordSource::Cache, &task.name, task.qtype, task.qclass)
            .await?
            .exact())
    }

    /// Attaches an answer record, pulling the exchange's address into the
    /// additional section for MX answers.
    async fn attach_answer(
        &self,
        reply: &mut Message,
        rr: ResourceRecord,
    ) -> Result<(), DomainError> {
        if let RData::MX { exchange, .. } = &rr.data {
            if let Some(extra) = self.lookup_host(exchange, rr.class).await? {
                reply.attach_additional(extra);
            }
        }
        reply.attach_answer(rr);
        Ok(())
    }

    /// A-record lookup used for MX additionals: exact zone hit first, then
    /// whatever the cache has closest.
    async fn lookup_host(
        &self,
        name: &DomainName,
        class: RecordClass,
    ) -> Result<Option<ResourceRecord>, DomainError> {
        let zone = self
            .store
            .lookup(RecordSource::Zone, name, RecordType::A, class)
            .await?;
        if let Some(rr) = zone.exact() {
            return Ok(Some(rr));
        }
        Ok(self
            .store
            .lookup(RecordSource::Cache, name, RecordType::A, class)
            .await?
            .any_match())
    }

    /// The iterative loop: find a starting delegation, then query each
    /// referred server with the original question until the cache can
    /// answer it or the chain dead-ends.
    async fn chase_referrals(
        &self,
        reply: &mut Message,
        queue: &mut TaskQueue,
        task: &Question,
    ) -> Result<(), DomainError> {
        let Some(mut peer) = self.delegation_address(&task.name, task.qclass).await? else {
            debug!(task = %task.name, "no delegation to chase, dropping task");
            queue.pop();
            return Ok(());
        };

        let filter = WritebackFilter {
            owner: task.name.clone(),
            qtype: task.qtype,
        };

        for _ in 0..MAX_REFERRAL_HOPS {
            let response = match self
                .upstream
                .query(peer, task, self.role.is_recursive())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(server = %peer, error = %e, "iterative query failed");
                    reply.flags.rcode = Rcode::ServerFailure;
                    queue.pop();
                    return Ok(());
                }
            };

            let answered = self.store.writeback(&response.answers, &filter, false).await?;
            let extra = self
                .store
                .writeback(&response.additionals, &filter, true)
                .await?;
            if answered || extra {
                // Task stays at the head; the next pass serves it from the
                // cache.
                debug!(task = %task.name, server = %peer, "answer cached");
                return Ok(());
            }

            match response
                .authorities
                .iter()
                .find_map(|rr| rr.data.a_addr())
            {
                Some(next) => {
                    debug!(task = %task.name, from = %peer, to = %next, "following referral");
                    peer = next;
                }
                None => {
                    debug!(task = %task.name, server = %peer, "chain dead-ended");
                    reply.flags.rcode = Rcode::Refused;
                    queue.pop();
                    return Ok(());
                }
            }
        }

        warn!(task = %task.name, "referral chain exceeded {} hops", MAX_REFERRAL_HOPS);
        reply.flags.rcode = Rcode::Refused;
        queue.pop();
        Ok(())
    }

    /// Address of the best-matching delegation for `name` from the
    /// authority file; the local role falls back to the hard-coded root.
    async fn delegation_address(
        &self,
        name: &DomainName,
        class: RecordClass,
    ) -> Result<Option<Ipv4Addr>, DomainError> {
        if let Some(addr) = self.authority_a(name, class).await? {
            return Ok(Some(addr));
        }
        if self.role.is_local() {
            return self.authority_a(&root_fallback_name(), class).await;
        }
        Ok(None)
    }

    async fn authority_a(
        &self,
        name: &DomainName,
        class: RecordClass,
    ) -> Result<Option<Ipv4Addr>, DomainError> {
        Ok(self
            .store
            .lookup(RecordSource::Authority, name, RecordType::A, class)
            .await?
            .any_match()
            .and_then(|rr| rr.data.a_addr()))
    }
}
